#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn marker(self) -> &'static str {
        match self {
            FenceKind::Backticks => CodeFence::BACKTICKS,
            FenceKind::Tildes => CodeFence::TILDES,
        }
    }
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: &'static str = "```";
    pub const TILDES: &'static str = "~~~";

    /// Fence kind if the line starts with a fence marker (leading spaces allowed).
    pub fn sig(line: &str) -> Option<FenceKind> {
        let t = line.trim_start();
        if t.starts_with(Self::BACKTICKS) {
            Some(FenceKind::Backticks)
        } else if t.starts_with(Self::TILDES) {
            Some(FenceKind::Tildes)
        } else {
            None
        }
    }

    /// Language tag following an opening marker, empty when absent.
    pub fn language(line: &str, kind: FenceKind) -> String {
        let fence_char = kind.marker().chars().next().unwrap_or('`');
        line.trim_start()
            .trim_start_matches(fence_char)
            .trim()
            .to_string()
    }

    pub fn closes(kind: FenceKind, line: &str) -> bool {
        Self::sig(line) == Some(kind)
    }

    /// Fence to serialize `content` with: backticks unless the content itself
    /// contains a backtick fence line.
    pub fn for_content(content: &str) -> FenceKind {
        let clashes = content
            .lines()
            .any(|line| Self::sig(line) == Some(FenceKind::Backticks));
        if clashes {
            FenceKind::Tildes
        } else {
            FenceKind::Backticks
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_backtick_fence() {
        assert_eq!(CodeFence::sig("```rust"), Some(FenceKind::Backticks));
    }

    #[test]
    fn detect_tilde_fence() {
        assert_eq!(CodeFence::sig("~~~"), Some(FenceKind::Tildes));
    }

    #[test]
    fn no_fence() {
        assert_eq!(CodeFence::sig("hello"), None);
    }

    #[test]
    fn language_follows_marker() {
        assert_eq!(CodeFence::language("```javascript", FenceKind::Backticks), "javascript");
        assert_eq!(CodeFence::language("~~~~ python  ", FenceKind::Tildes), "python");
        assert_eq!(CodeFence::language("```", FenceKind::Backticks), "");
    }

    #[test]
    fn does_not_close_mismatched_fence() {
        assert!(!CodeFence::closes(FenceKind::Backticks, "~~~"));
        assert!(!CodeFence::closes(FenceKind::Tildes, "```"));
        assert!(CodeFence::closes(FenceKind::Tildes, "~~~"));
    }

    #[test]
    fn content_with_backtick_fence_uses_tildes() {
        assert_eq!(
            CodeFence::for_content("text\n```inner\n```"),
            FenceKind::Tildes
        );
        assert_eq!(CodeFence::for_content("let x = 1;"), FenceKind::Backticks);
    }
}
