/// Dashboard-wide UI flags, created once when the application starts and
/// handed to the components that read or toggle them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub is_dark_mode: bool,
    pub is_sidebar_collapsed: bool,
}

impl GlobalState {
    pub fn init() -> Self {
        Self::default()
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.is_dark_mode = enabled;
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        self.is_sidebar_collapsed = collapsed;
    }
}
