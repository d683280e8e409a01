use crate::error::{InvokeError, InvokeResult};
use crate::page::Property;

pub const METHOD_NAME_KEY: &str = "methodName";
pub const AUTO_CLEAR_KEY: &str = "autoClear";
pub const AUTO_INVOKE_KEY: &str = "autoInvoke";
pub const ETH_VALUE_KEY: &str = "ethValue";

/// Widget properties the orchestrator understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetProperties {
    pub method_name: String,
    /// Clear bound inputs after a manual invocation.
    pub auto_clear: bool,
    /// Re-run the (read) method periodically.
    pub auto_invoke: bool,
    /// Amount of wei attached to writes.
    pub eth_value: Option<String>,
}

fn find<'a>(properties: &'a [Property], key: &str) -> Option<&'a str> {
    properties
        .iter()
        .find(|property| property.key == key)
        .map(|property| property.value.as_str())
}

/// Booleans are carried as strings; only `"true"` is true.
fn flag(properties: &[Property], key: &str) -> bool {
    find(properties, key).map(str::trim) == Some("true")
}

impl WidgetProperties {
    pub fn parse(properties: &[Property]) -> InvokeResult<Self> {
        let method_name = find(properties, METHOD_NAME_KEY)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(InvokeError::MissingProperty(METHOD_NAME_KEY))?
            .to_string();

        let eth_value = find(properties, ETH_VALUE_KEY)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            method_name,
            auto_clear: flag(properties, AUTO_CLEAR_KEY),
            auto_invoke: flag(properties, AUTO_INVOKE_KEY),
            eth_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let properties = vec![
            Property::new("methodName", "deposit"),
            Property::new("autoClear", "true"),
            Property::new("autoInvoke", "TRUE"),
            Property::new("ethValue", "1000000000000000000"),
        ];
        let parsed = WidgetProperties::parse(&properties).unwrap();
        assert_eq!(parsed.method_name, "deposit");
        assert!(parsed.auto_clear);
        assert!(!parsed.auto_invoke);
        assert_eq!(parsed.eth_value.as_deref(), Some("1000000000000000000"));
    }

    #[test]
    fn test_method_name_is_required() {
        let properties = vec![Property::new("autoInvoke", "true")];
        assert_eq!(
            WidgetProperties::parse(&properties),
            Err(InvokeError::MissingProperty("methodName"))
        );

        let blank = vec![Property::new("methodName", " ")];
        assert!(WidgetProperties::parse(&blank).is_err());
    }

    #[test]
    fn test_empty_eth_value_is_absent() {
        let properties = vec![Property::new("methodName", "x"), Property::new("ethValue", "")];
        assert_eq!(WidgetProperties::parse(&properties).unwrap().eth_value, None);
    }
}
