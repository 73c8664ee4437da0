/// Upstream path with an optional `{id}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTemplate(&'static str);

const ID_PLACEHOLDER: &str = "{id}";

impl PathTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    pub fn is_id_scoped(&self) -> bool {
        self.0.contains(ID_PLACEHOLDER)
    }

    /// Substitute a percent-encoded `id` for the placeholder.
    pub fn resolve(&self, id: &str) -> String {
        self.0.replace(ID_PLACEHOLDER, &urlencoding::encode(id))
    }
}
