//! Convenience macros for component development.

/// Builds a [`ComponentInfo`](crate::component::ComponentInfo).
///
/// # Example
/// ```rust,ignore
/// let info = component_info!(
///     id: "hello-world",
///     name: "Hello World",
///     version: "1.0.0",
///     description: "Greets visitors",
///     author: "Dev"
/// );
/// ```
#[macro_export]
macro_rules! component_info {
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr
    ) => {
        $crate::component_info!(
            id: $id,
            name: $name,
            version: $version,
            description: $desc,
            author: $author,
            kind: $crate::component::ComponentKind::Plugin
        )
    };
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr,
        kind: $kind:expr
    ) => {
        $crate::component::ComponentInfo {
            id: $id.to_string(),
            name: $name.to_string(),
            version: $version.to_string(),
            description: $desc.to_string(),
            author: $author.to_string(),
            kind: $kind,
        }
    };
}
