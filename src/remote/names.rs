// ABOUTME: Stable names of remotely invocable operations and mirrored properties.
// ABOUTME: Also maps container ids onto identifier-safe collection keys.

pub const DEFAULT_NAMESPACE: &str = "ecsRuntime";

pub const OP_ADD_CONTAINER: &str = "addContainer";
pub const OP_START_CONTAINER: &str = "startContainer";
pub const OP_STOP_CONTAINER: &str = "stopContainer";
pub const OP_MIGRATE_CONTAINER: &str = "migrateContainer";
pub const OP_UPDATE_CONTAINER: &str = "updateContainer";
pub const OP_UNDEPLOY_CONTAINER: &str = "undeployContainer";
pub const OP_GET_STATE: &str = "getState";
pub const OP_SYSTEM_NAME: &str = "getContainerSystemName";
pub const OP_SYSTEM_VERSION: &str = "getContainerSystemVersion";

pub const OPERATIONS: [&str; 9] = [
    OP_ADD_CONTAINER,
    OP_START_CONTAINER,
    OP_STOP_CONTAINER,
    OP_MIGRATE_CONTAINER,
    OP_UPDATE_CONTAINER,
    OP_UNDEPLOY_CONTAINER,
    OP_GET_STATE,
    OP_SYSTEM_NAME,
    OP_SYSTEM_VERSION,
];

pub const COLL_CONTAINERS: &str = "containers";

pub const PROP_ID: &str = "id";
pub const PROP_NAME: &str = "name";
pub const PROP_VERSION: &str = "version";
pub const PROP_STATE: &str = "state";
pub const PROP_RESOURCE: &str = "resource";
pub const PROP_LAST_CHANGED: &str = "lastChanged";

/// `<namespace>_<operation>`
pub fn qualified_name(namespace: &str, operation: &str) -> String {
    format!("{namespace}_{operation}")
}

/// Turn an arbitrary id into a key made of letters, digits, and `_` that
/// starts with a letter.
pub fn fix_id(id: &str) -> String {
    let mut result = String::with_capacity(id.len() + 1);
    if id.chars().next().is_some_and(|c| !c.is_alphabetic()) {
        result.push('a');
    }
    result.extend(id.chars().map(|c| {
        if c.is_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_joins_with_underscore() {
        assert_eq!(
            qualified_name(DEFAULT_NAMESPACE, OP_GET_STATE),
            "ecsRuntime_getState"
        );
    }

    #[test]
    fn fix_id_examples() {
        assert_eq!(fix_id("demo"), "demo");
        assert_eq!(fix_id("my-app:1.0"), "my_app_1_0");
        assert_eq!(fix_id("42"), "a42");
        assert_eq!(fix_id("_x"), "a_x");
        assert_eq!(fix_id("file:///a.zip"), "file____a_zip");
        assert_eq!(fix_id(""), "");
    }
}
