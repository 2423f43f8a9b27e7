//! The manager bundle handed to the interpreter and resolver.

use tksc_sym::TypeRegistry;

use crate::color::ColorManager;
use crate::function::FunctionManager;
use crate::unit::UnitManager;

/// The three extension registries a batch evaluates against.
///
/// Registration happens before the first evaluation; afterwards the config
/// is shared read-only. `clone()` gives a batch its own registration slots
/// while the parsed spec scripts stay shared (`Arc`'d ASTs).
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub colors: ColorManager,
    pub units: UnitManager,
    pub functions: FunctionManager,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the type registry the symbol table consults: registered
    /// color subtypes plus registered unit keywords on top of the
    /// defaults.
    pub fn type_registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        for subtype in self.colors.subtype_names() {
            registry.register_color_subtype(&subtype);
        }
        for keyword in self.units.keywords() {
            registry.register_unit(&keyword);
        }
        registry
    }

    /// Unit keywords beyond the lexer's base set; wired into every parse.
    pub fn unit_keywords(&self) -> Vec<String> {
        self.units.keywords()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_hex() {
        let config = Config::new();
        let registry = config.type_registry();
        assert!(registry.has_color_subtype("hex"));
        assert!(registry.has_unit("px"));
    }

    #[test]
    fn test_registry_reflects_registrations() {
        let mut config = Config::new();
        config
            .colors
            .register(
                "https://specs.tokenscript.dev/color/rgb/0/",
                &serde_json::json!({"name": "rgb", "type": "color"}),
            )
            .unwrap();
        config
            .units
            .register(
                "gu",
                &serde_json::json!({
                    "name": "https://specs.tokenscript.dev/unit/gu/0/",
                    "keyword": "gu",
                    "type": "absolute"
                }),
            )
            .unwrap();

        let registry = config.type_registry();
        assert!(registry.has_color_subtype("rgb"));
        assert!(registry.has_unit("gu"));
        assert_eq!(config.unit_keywords(), vec!["gu".to_string()]);
    }
}
