//! Tests for the builder DSL.

use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::error::{ConfigError, Result};
use crate::node::{DefaultChildren, Node};
use crate::processor::Processor;

/// Builds a tree rooted at an array node named `root`.
fn build(f: impl FnOnce(&mut ArrayNodeDefinition)) -> Result<Arc<Node>> {
    let mut builder = TreeBuilder::new("root");
    f(builder.root_node());
    builder.build_tree()
}

fn process(tree: &Node, configs: Vec<Value>) -> Result<Value> {
    Processor::new().process(tree, configs)
}

fn definition_message(err: ConfigError) -> String {
    assert!(err.is_definition_error(), "expected a definition error, got {err:?}");
    err.to_string()
}

// ============================================================================
// Scalar definitions
// ============================================================================

#[test]
fn test_integer_bounds_and_default() {
    let tree = build(|root| {
        root.children(|c| {
            c.integer_node("port").min(1).max(65535).default_value(5432);
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![json!({})]).unwrap(), json!({"port": 5432}));

    let err = process(&tree, vec![json!({"port": 70000})]).unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("too big"));
    assert_eq!(err.path(), Some("root.port"));
}

#[test]
fn test_min_greater_than_max_is_reported_with_path() {
    let err = build(|root| {
        root.children(|c| {
            c.integer_node("port").min(10).max(5);
        });
    })
    .unwrap_err();

    assert_eq!(
        definition_message(err),
        "You cannot define a max(5) as you already have a min(10) (at path \"root.port\")"
    );
}

#[test]
fn test_float_bounds() {
    let tree = build(|root| {
        root.children(|c| {
            c.float_node("ratio").min(0.0).max(1.0);
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"ratio": 0.5})]).unwrap(),
        json!({"ratio": 0.5})
    );
    let err = process(&tree, vec![json!({"ratio": 1.5})]).unwrap_err();
    assert!(err.to_string().contains("too big"));
}

#[test]
fn test_enum_values() {
    let tree = build(|root| {
        root.children(|c| {
            c.enum_node("level").values(["low", "high"]);
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"level": "low"})]).unwrap(),
        json!({"level": "low"})
    );
    let err = process(&tree, vec![json!({"level": "medium"})]).unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("Permissible values: [\"low\",\"high\"]"));
}

#[test]
fn test_enum_needs_distinct_values() {
    let err = build(|root| {
        root.children(|c| {
            c.enum_node("level").values(["low", "low"]);
        });
    })
    .unwrap_err();

    assert!(definition_message(err).contains("at least two distinct values"));
}

#[test]
fn test_enum_without_values() {
    let err = build(|root| {
        root.children(|c| {
            c.enum_node("level");
        });
    })
    .unwrap_err();

    assert!(definition_message(err).contains("You must call values() on enum nodes"));
}

#[test]
fn test_boolean_treats_null_as_true() {
    let tree = build(|root| {
        root.children(|c| {
            c.boolean_node("debug");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"debug": null})]).unwrap(),
        json!({"debug": true})
    );
    let err = process(&tree, vec![json!({"debug": "yes"})]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidType { .. }));
}

#[test]
fn test_treat_like_equivalences() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("driver")
                .treat_null_like("pdo")
                .treat_true_like("pdo")
                .treat_false_like("none");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"driver": null})]).unwrap(),
        json!({"driver": "pdo"})
    );
    assert_eq!(
        process(&tree, vec![json!({"driver": false})]).unwrap(),
        json!({"driver": "none"})
    );
}

#[test]
fn test_cannot_be_empty() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("name").cannot_be_empty();
        });
    })
    .unwrap();

    let err = process(&tree, vec![json!({"name": ""})]).unwrap_err();
    assert!(err.to_string().contains("cannot contain an empty value"));
}

#[test]
fn test_default_supplier_and_variable_node() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("id").default_with(|| json!("generated"));
            c.variable_node("extra");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"extra": {"nested": [1, 2]}})]).unwrap(),
        json!({"id": "generated", "extra": {"nested": [1, 2]}})
    );
}

#[test]
fn test_cannot_be_overwritten() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("secret").cannot_be_overwritten(true);
        });
    })
    .unwrap();

    assert!(process(&tree, vec![json!({"secret": "a"})]).is_ok());
    let err = process(&tree, vec![json!({"secret": "a"}), json!({"secret": "b"})]).unwrap_err();
    assert!(matches!(err, ConfigError::ForbiddenOverwrite { .. }));
    assert_eq!(err.path(), Some("root.secret"));
}

#[test]
fn test_info_example_and_attributes() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("host")
                .info("Database host")
                .example("db.local")
                .attribute("deprecated", true);
        });
    })
    .unwrap();

    let host = &tree.children().unwrap()["host"];
    assert_eq!(host.info(), Some("Database host"));
    assert_eq!(host.example(), Some(&json!("db.local")));
    assert_eq!(host.attribute("deprecated"), Some(&json!(true)));
}

// ============================================================================
// Expressions and rules
// ============================================================================

#[test]
fn test_before_normalization_wraps_strings() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("hosts")
                .before_normalization(|e| {
                    e.if_string().then(|v| Ok(json!([v])));
                })
                .scalar_prototype(|_| {});
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"hosts": "a"})]).unwrap(),
        json!({"hosts": ["a"]})
    );
}

#[test]
fn test_if_in_array_rewrites_aliases() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("mode").before_normalization(|e| {
                e.if_in_array(["dev", "development"]).then(|_| Ok(json!("dev")));
            });
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"mode": "development"})]).unwrap(),
        json!({"mode": "dev"})
    );
}

#[test]
fn test_then_invalid_is_wrapped_with_path() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("mode").validate(|r| {
                r.if_not_in_array(["a", "b"]).then_invalid("Bad mode {}");
            });
        });
    })
    .unwrap();

    assert!(process(&tree, vec![json!({"mode": "a"})]).is_ok());
    let err = process(&tree, vec![json!({"mode": "c"})]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidConfiguration { source: Some(_), .. }));
    assert_eq!(err.path(), Some("root.mode"));
    assert_eq!(
        err.to_string(),
        "Invalid configuration for path \"root.mode\": Bad mode \"c\""
    );
}

#[test]
fn test_then_unset_drops_key() {
    let tree = build(|root| {
        root.children(|c| {
            c.scalar_node("legacy").before_normalization(|e| {
                e.always().then_unset();
            });
            c.scalar_node("name");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"legacy": "x", "name": "n"})]).unwrap(),
        json!({"name": "n"})
    );
}

#[test]
fn test_then_empty_object() {
    let tree = build(|root| {
        root.children(|c| {
            c.variable_node("meta").before_normalization(|e| {
                e.if_true().then_empty_object();
            });
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"meta": true})]).unwrap(),
        json!({"meta": {}})
    );
}

#[test]
fn test_plain_rule_closures() {
    let tree = build(|root| {
        root.children(|c| {
            let n = c.integer_node("n");
            n.normalization_rules()
                .before_fn(|v| Ok(if v.is_string() { json!(0) } else { v }));
            n.validation_rules()
                .rule_fn(|v| Ok(json!(v.as_i64().unwrap_or(0) * 2)));
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![json!({"n": 4})]).unwrap(), json!({"n": 8}));
    assert_eq!(process(&tree, vec![json!({"n": "x"})]).unwrap(), json!({"n": 0}));
}

#[test]
fn test_expression_without_if_part() {
    let err = build(|root| {
        root.children(|c| {
            c.scalar_node("x").before_normalization(|e| {
                e.then(Ok);
            });
        });
    })
    .unwrap_err();

    assert_eq!(definition_message(err), "You must specify an if part.");
}

#[test]
fn test_expression_without_then_part() {
    let err = build(|root| {
        root.children(|c| {
            c.scalar_node("x").validate(|r| {
                r.if_string();
            });
        });
    })
    .unwrap_err();

    assert_eq!(definition_message(err), "You must specify a then part.");
}

#[test]
fn test_merge_builder_flags() {
    let mut merge = MergeBuilder::new();
    assert!(!merge.allows_false());
    assert!(merge.allows_overwrite());

    merge.allow_unset(true).deny_overwrite(true);
    assert!(merge.allows_false());
    assert!(!merge.allows_overwrite());
}

// ============================================================================
// Array definitions
// ============================================================================

#[test]
fn test_new_keys_policy() {
    let open = build(|root| {
        root.children(|c| {
            c.scalar_node("a");
            c.scalar_node("b");
        });
    })
    .unwrap();
    assert_eq!(
        process(&open, vec![json!({"a": 1}), json!({"b": 2})]).unwrap(),
        json!({"a": 1, "b": 2})
    );

    let closed = build(|root| {
        root.disallow_new_keys_in_subsequent_configs().children(|c| {
            c.scalar_node("a");
            c.scalar_node("b");
        });
    })
    .unwrap();
    let err = process(&closed, vec![json!({"a": 1}), json!({"b": 2})]).unwrap_err();
    assert!(err.is_invalid_configuration());
    assert!(err.to_string().contains("not allowed to define new elements"));
}

#[test]
fn test_new_keys_rejected_after_empty_or_null_config() {
    let tree = build(|root| {
        root.disallow_new_keys_in_subsequent_configs().children(|c| {
            c.scalar_node("a");
            c.scalar_node("b");
            c.array_node("x")
                .disallow_new_keys_in_subsequent_configs()
                .children(|c| {
                    c.scalar_node("a");
                    c.scalar_node("b");
                });
        });
    })
    .unwrap();

    let err = process(&tree, vec![json!({}), json!({"b": 2})]).unwrap_err();
    assert!(err.is_invalid_configuration());
    assert_eq!(err.path(), Some("root"));

    for first in [json!({"x": {}}), json!({"x": null})] {
        let err = process(&tree, vec![first, json!({"x": {"b": 2}})]).unwrap_err();
        assert!(err.is_invalid_configuration());
        assert_eq!(err.path(), Some("root.x"));
    }
}

#[test]
fn test_duplicate_child_name_is_reported() {
    let err = build(|root| {
        root.children(|c| {
            c.scalar_node("a");
            c.integer_node("a");
        });
    })
    .unwrap_err();

    assert_eq!(
        definition_message(err),
        "A child node named \"a\" already exists. (at path \"root\")"
    );
}

#[test]
fn test_cannot_be_empty_rejected_on_array_nodes() {
    let err = build(|root| {
        root.children(|c| {
            c.array_node("list").cannot_be_empty();
        });
    })
    .unwrap_err();

    assert_eq!(
        definition_message(err),
        "->cannotBeEmpty() is not applicable to array nodes at path \"root.list\""
    );
}

#[test]
fn test_can_be_unset() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("logging").can_be_unset(true).children(|c| {
                c.scalar_node("level").default_value("info");
            });
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"logging": {"level": "debug"}}), json!({"logging": false})])
            .unwrap(),
        json!({})
    );
}

#[test]
fn test_false_rejected_without_can_be_unset() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("logging");
        });
    })
    .unwrap();

    let err = process(&tree, vec![json!({"logging": false})]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidType { .. }));
}

#[test]
fn test_can_be_enabled() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("cache").can_be_enabled().children(|c| {
                c.scalar_node("dir").default_value("/tmp");
            });
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![json!({})]).unwrap(), json!({}));
    assert_eq!(
        process(&tree, vec![json!({"cache": null})]).unwrap(),
        json!({"cache": {"enabled": true, "dir": "/tmp"}})
    );
    assert_eq!(
        process(&tree, vec![json!({"cache": {"dir": "/var"}})]).unwrap(),
        json!({"cache": {"enabled": true, "dir": "/var"}})
    );
    assert_eq!(
        process(&tree, vec![json!({"cache": false})]).unwrap(),
        json!({"cache": {"enabled": false, "dir": "/tmp"}})
    );
    assert_eq!(
        process(&tree, vec![json!({"cache": true}), json!({"cache": false})]).unwrap(),
        json!({"cache": {"enabled": false, "dir": "/tmp"}})
    );
}

#[test]
fn test_can_be_disabled() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("metrics").can_be_disabled();
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"metrics": {}})]).unwrap(),
        json!({"metrics": {"enabled": true}})
    );
    assert_eq!(
        process(&tree, vec![json!({"metrics": false})]).unwrap(),
        json!({"metrics": {"enabled": false}})
    );
}

#[test]
fn test_add_defaults_if_not_set() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("pool").add_defaults_if_not_set().children(|c| {
                c.integer_node("size").default_value(4);
                c.scalar_node("name");
            });
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![]).unwrap(), json!({"pool": {"size": 4}}));
}

#[test]
fn test_append_and_key_normalization_switch() {
    let tree = build(|root| {
        let mut extra = ScalarNodeDefinition::new("extra");
        extra.default_value("x");
        root.normalize_keys(false).append(extra).children(|c| {
            c.scalar_node("foo-bar");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"foo-bar": 1})]).unwrap(),
        json!({"foo-bar": 1, "extra": "x"})
    );
}

#[test]
fn test_ignore_extra_keys() {
    let tree = build(|root| {
        root.ignore_extra_keys().children(|c| {
            c.scalar_node("a");
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"a": 1, "zzz": 2})]).unwrap(),
        json!({"a": 1})
    );
}

#[test]
fn test_perform_no_deep_merging() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("opts").perform_no_deep_merging().children(|c| {
                c.scalar_node("x");
                c.scalar_node("y");
            });
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"opts": {"x": 1}}), json!({"opts": {"y": 2}})]).unwrap(),
        json!({"opts": {"y": 2}})
    );
}

#[test]
fn test_concrete_node_rejects_prototype_options() {
    let err = build(|root| {
        root.use_attribute_as_key("id", true);
    })
    .unwrap_err();
    assert_eq!(
        definition_message(err),
        "->useAttributeAsKey() is not applicable to concrete nodes at path \"root\""
    );

    let err = build(|root| {
        root.children(|c| {
            c.array_node("list").default_value(json!([]));
        });
    })
    .unwrap_err();
    assert!(definition_message(err).contains("->defaultValue() is not applicable"));
}

// ============================================================================
// Prototyped array definitions
// ============================================================================

fn keyed_hosts(root: &mut ArrayNodeDefinition) {
    root.children(|c| {
        c.array_node("hosts")
            .use_attribute_as_key("name", true)
            .array_prototype(|p| {
                p.children(|c| {
                    c.scalar_node("ip").required();
                    c.integer_node("weight").default_value(1);
                });
            });
    });
}

#[test]
fn test_keyed_prototype() {
    let tree = build(keyed_hosts).unwrap();

    let result = process(
        &tree,
        vec![
            json!({"hosts": [{"name": "a", "ip": "10.0.0.1"}]}),
            json!({"hosts": [{"name": "a", "weight": 5}, {"name": "b", "ip": "10.0.0.2"}]}),
        ],
    )
    .unwrap();

    assert_eq!(
        result,
        json!({"hosts": {
            "a": {"ip": "10.0.0.1", "weight": 5},
            "b": {"ip": "10.0.0.2", "weight": 1}
        }})
    );
}

#[test]
fn test_keyed_prototype_duplicates_and_entry_paths() {
    let tree = build(keyed_hosts).unwrap();

    let err = process(&tree, vec![json!({"hosts": [{"name": "a", "ip": "1"}, {"name": "a", "ip": "2"}]})])
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateKey { .. }));

    let err = process(&tree, vec![json!({"hosts": [{"name": "a"}]})]).unwrap_err();
    assert_eq!(err.path(), Some("root.hosts.a.ip"));
}

#[test]
fn test_prototype_new_keys_can_be_disallowed() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("hosts")
                .disallow_new_keys_in_subsequent_configs()
                .use_attribute_as_key("name", true)
                .array_prototype(|p| {
                    p.children(|c| {
                        c.scalar_node("ip");
                    });
                });
        });
    })
    .unwrap();

    let err = process(
        &tree,
        vec![
            json!({"hosts": [{"name": "a", "ip": "1"}]}),
            json!({"hosts": [{"name": "b", "ip": "2"}]}),
        ],
    )
    .unwrap_err();
    assert_eq!(err.path(), Some("root.hosts"));
}

#[test]
fn test_untyped_prototype_from_registry() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("ports")
                .prototype("INTEGER")
                .unwrap()
                .as_integer_mut()
                .unwrap()
                .max(100);
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![json!({"ports": [1, 2]}), json!({"ports": [3]})]).unwrap(),
        json!({"ports": [1, 2, 3]})
    );
    let err = process(&tree, vec![json!({"ports": [1, 500]})]).unwrap_err();
    assert_eq!(err.path(), Some("root.ports.1"));
}

#[test]
fn test_requires_at_least_one_element() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("tags")
                .requires_at_least_one_element()
                .scalar_prototype(|_| {});
        });
    })
    .unwrap();

    let err = process(&tree, vec![json!({"tags": []})]).unwrap_err();
    assert!(err.to_string().contains("should have at least 1 element(s) defined"));
}

#[test]
fn test_prototype_explicit_default() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("list")
                .default_value(json!(["a"]))
                .scalar_prototype(|_| {});
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![json!({})]).unwrap(), json!({"list": ["a"]}));
}

#[test]
fn test_prototype_default_must_be_array_like() {
    let err = build(|root| {
        root.children(|c| {
            c.array_node("list").default_value("oops").scalar_prototype(|_| {});
        });
    })
    .unwrap_err();
    assert!(err.is_definition_error());
}

#[test]
fn test_default_children_of_array_prototype() {
    let tree = build(|root| {
        root.children(|c| {
            c.array_node("connections")
                .add_default_children_if_none_set(DefaultChildren::Single)
                .array_prototype(|p| {
                    p.children(|c| {
                        c.scalar_node("host").default_value("localhost");
                    });
                });
            c.array_node("named")
                .use_attribute_as_key("name", true)
                .add_default_children_if_none_set(DefaultChildren::Names(vec![
                    "a".to_string(),
                    "b".to_string(),
                ]))
                .scalar_prototype(|p| {
                    p.default_value("x");
                });
        });
    })
    .unwrap();

    assert_eq!(
        process(&tree, vec![]).unwrap(),
        json!({
            "connections": [{"host": "localhost"}],
            "named": {"a": "x", "b": "x"}
        })
    );
}

/// Builds `root.list` as a scalar-prototyped array configured by `configure`
/// and checks the reported definition error.
fn assert_list_definition_error(configure: impl FnOnce(&mut ArrayNodeDefinition), expected: &str) {
    let err = build(|root| {
        root.children(|c| {
            let list = c.array_node("list");
            configure(list);
            list.scalar_prototype(|_| {});
        });
    })
    .unwrap_err();

    let message = definition_message(err);
    assert!(message.contains(expected), "{message}");
    assert!(message.contains("at path \"root.list\""), "{message}");
}

#[test]
fn test_default_children_validation() {
    assert_list_definition_error(
        |list| {
            list.use_attribute_as_key("id", true)
                .add_default_children_if_none_set(DefaultChildren::Count(2));
        },
        "should set default children names",
    );
    assert_list_definition_error(
        |list| {
            list.add_default_children_if_none_set(DefaultChildren::Names(vec!["a".into()]));
        },
        "might not set default children names",
    );
    assert_list_definition_error(
        |list| {
            list.add_default_children_if_none_set(DefaultChildren::Count(0));
        },
        "needs at least one child",
    );
    assert_list_definition_error(
        |list| {
            list.default_value(json!([]))
                .add_default_children_if_none_set(DefaultChildren::Single);
        },
        "A default value and default children might not be used together",
    );
}

#[test]
fn test_prototype_rejects_concrete_options() {
    assert_list_definition_error(
        |list| {
            list.add_defaults_if_not_set();
        },
        "->addDefaultsIfNotSet() is not applicable to prototype nodes",
    );
    assert_list_definition_error(
        |list| {
            list.children(|c| {
                c.scalar_node("a");
            });
        },
        "can not have concrete children",
    );
}

// ============================================================================
// Node builder registry
// ============================================================================

#[test]
fn test_node_types_are_case_insensitive() {
    let tree = build(|root| {
        root.children(|c| {
            c.node("flag", "Boolean").unwrap().default_true();
            c.node("count", NodeType::Integer).unwrap();
        });
    })
    .unwrap();

    assert!(matches!(
        tree.children().unwrap()["count"].kind(),
        crate::node::NodeKind::Integer(_)
    ));
    assert_eq!(process(&tree, vec![]).unwrap(), json!({"flag": true}));
}

#[test]
fn test_unknown_node_type() {
    let mut outcome = None;
    build(|root| {
        root.children(|c| {
            outcome = Some(c.node("x", "money").map(|_| ()));
        });
    })
    .unwrap();

    let err = outcome.unwrap().unwrap_err();
    assert!(matches!(err, ConfigError::Runtime(_)));
    assert_eq!(err.to_string(), "The node type \"money\" is not registered");
}

#[test]
fn test_custom_node_class_is_inherited_by_nested_arrays() {
    let tree = build(|root| {
        root.children(|c| {
            c.set_node_class(
                "port",
                Arc::new(|name: &str| {
                    let mut port = IntegerNodeDefinition::new(name);
                    port.min(1).max(65535);
                    Definition::from(port)
                }),
            );
            c.node("http", "port").unwrap().default_value(80);
            c.array_node("admin").children(|c| {
                c.node("https", "PORT").unwrap();
            });
        });
    })
    .unwrap();

    assert_eq!(process(&tree, vec![]).unwrap(), json!({"http": 80}));
    let err = process(&tree, vec![json!({"admin": {"https": 70000}})]).unwrap_err();
    assert_eq!(err.path(), Some("root.admin.https"));
}

#[test]
fn test_registry_lookup() {
    let registry = NodeRegistry::new();
    for node_type in NodeType::ALL {
        assert!(registry.contains(node_type.as_str()));
    }
    assert!(registry.contains("SCALAR"));
    assert!(!registry.contains("money"));
    assert_eq!(NodeType::Enum.to_string(), "enum");
}

// ============================================================================
// Tree builder
// ============================================================================

#[test]
fn test_tree_is_cached_until_root_changes() {
    let mut builder = TreeBuilder::new("root");
    builder.root_node().children(|c| {
        c.scalar_node("a");
    });

    let first = builder.build_tree().unwrap();
    let second = builder.build_tree().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    builder.root_node().children(|c| {
        c.scalar_node("b");
    });
    let third = builder.build_tree().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.children().unwrap().len(), 2);
}

#[test]
fn test_tree_with_scalar_root() {
    let mut builder = TreeBuilder::with_type("level", "enum").unwrap();
    builder
        .root_node()
        .as_enum_mut()
        .unwrap()
        .values(["debug", "info"]);
    let tree = builder.build_tree().unwrap();

    assert_eq!(tree.name(), "level");
    assert_eq!(
        process(&tree, vec![json!("debug"), json!("info")]).unwrap(),
        json!("info")
    );
    assert!(process(&tree, vec![json!("trace")]).is_err());
}

#[test]
fn test_tree_with_unknown_root_type() {
    let err = TreeBuilder::with_type("root", "money").unwrap_err();
    assert!(!err.is_definition_error());
    assert!(err.to_string().contains("not registered"));
}
