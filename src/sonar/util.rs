//! Component key helpers.
//!
//! SonarQube component keys look like `group:artifact[:branch]:path/File.java`
//! for Maven projects, or a bare project key otherwise.

/// Reduce a configured component to the project key used to scope issue searches.
///
/// Keeps the first two `:` segments (`group:artifact`) and drops anything
/// after them. A key without `:` is returned trimmed but otherwise as is.
pub fn isolate_component_key(component: &str) -> String {
    let component = component.trim();
    let mut segments = component.splitn(3, ':');

    match (segments.next(), segments.next()) {
        (Some(group), Some(artifact)) => format!("{}:{}", group, artifact),
        _ => component.to_string(),
    }
}

/// The file path part of an issue's component key, if it has one.
pub fn component_path(component: &str) -> Option<&str> {
    component
        .splitn(3, ':')
        .nth(2)
        .filter(|path| !path.is_empty())
}
