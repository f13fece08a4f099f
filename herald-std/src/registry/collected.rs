use super::RegistryBuilder;
use crate::config::HandlerCategories;

/// A binding submitted through `inventory`.
///
/// `#[handler(auto_bind)]` and `#[subscribe(auto_bind)]` submit one per
/// annotated function; [`RegistryBuilder::auto_bind`] applies them.
pub struct AutoBinding {
    /// Category the binding belongs to.
    pub category: HandlerCategories,
    /// Name for debugging and ordering.
    pub name: &'static str,
    /// Adds the binding to a builder.
    pub register: fn(RegistryBuilder) -> RegistryBuilder,
}

impl AutoBinding {
    /// Create a new auto-binding entry.
    pub const fn new(
        category: HandlerCategories,
        name: &'static str,
        register: fn(RegistryBuilder) -> RegistryBuilder,
    ) -> Self {
        Self {
            category,
            name,
            register,
        }
    }
}

inventory::collect!(AutoBinding);

impl RegistryBuilder {
    /// Applies every submitted [`AutoBinding`] whose category is selected.
    ///
    /// Link order is not stable, so bindings are applied sorted by name.
    pub fn auto_bind(self, categories: HandlerCategories) -> Self {
        let mut entries: Vec<&AutoBinding> = inventory::iter::<AutoBinding>
            .into_iter()
            .filter(|entry| categories.intersects(entry.category))
            .collect();

        entries.sort_by_key(|entry| entry.name);

        entries.into_iter().fold(self, |builder, entry| {
            tracing::debug!(binding = entry.name, "auto-binding");
            (entry.register)(builder)
        })
    }
}
