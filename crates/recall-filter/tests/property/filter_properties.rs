use proptest::prelude::*;
use recall_filter::{
    compile, evaluate, Condition, Dialect, FilterExpression, FilterOperator, GroupLogic, Operand,
};
use serde_json::{json, Map, Value};

// --- Reference interpreter, written against JSON pointers ---

fn lookup<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record.pointer(&format!("/{}", field.replace('.', "/")))
}

/// A top-level `null` is an absent column; a nested `null` is a present key.
fn present(record: &Value, field: &str) -> bool {
    match lookup(record, field) {
        Some(Value::Null) => field.contains('.'),
        other => other.is_some(),
    }
}

/// The regex patterns generated below, with their meaning spelled out.
const PATTERNS: &[&str] = &["^al", "ta$", "mm", "^(alpha|beta)$"];

fn pattern_matches(pattern: &str, s: &str) -> bool {
    match pattern {
        "^al" => s.starts_with("al"),
        "ta$" => s.ends_with("ta"),
        "mm" => s.contains("mm"),
        "^(alpha|beta)$" => s == "alpha" || s == "beta",
        other => panic!("no reference meaning for {other}"),
    }
}

fn same(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn members(v: &Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn ordered(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Value::Number(x), Value::Number(y)) = (a, b) {
        return x.as_f64()?.partial_cmp(&y.as_f64()?);
    }
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Some(x.as_bytes().cmp(y.as_bytes()));
    }
    None
}

fn reference_condition(c: &Condition, record: &Value) -> bool {
    use FilterOperator::*;
    let value = lookup(record, &c.field);
    let positive = |op: FilterOperator| -> bool {
        let Some(v) = value else { return false };
        match (op, &c.operand) {
            (Eq, Operand::Scalar(t)) => same(v, t),
            (Gt, Operand::Scalar(t)) => ordered(v, t) == Some(std::cmp::Ordering::Greater),
            (Gte, Operand::Scalar(t)) => {
                matches!(ordered(v, t), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal))
            }
            (Lt, Operand::Scalar(t)) => ordered(v, t) == Some(std::cmp::Ordering::Less),
            (Lte, Operand::Scalar(t)) => {
                matches!(ordered(v, t), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal))
            }
            (Between, Operand::Pair(lo, hi)) => {
                matches!(ordered(v, lo), Some(o) if o.is_ge()) && matches!(ordered(v, hi), Some(o) if o.is_le())
            }
            (Contains | StartsWith | EndsWith, Operand::Scalar(Value::String(n))) => {
                let Some(s) = v.as_str() else { return false };
                let (s, n) = if c.case_sensitive {
                    (s.to_string(), n.clone())
                } else {
                    (s.to_lowercase(), n.to_lowercase())
                };
                match op {
                    Contains => s.contains(&n),
                    StartsWith => s.starts_with(&n),
                    _ => s.ends_with(&n),
                }
            }
            (Regex, Operand::Scalar(Value::String(p))) => match v.as_str() {
                Some(s) if c.case_sensitive => pattern_matches(p, s),
                Some(s) => pattern_matches(p, &s.to_lowercase()),
                None => false,
            },
            (In, Operand::List(items)) => items.iter().any(|i| same(i, v)),
            (AnyOf, Operand::List(items)) => members(v).iter().any(|m| items.iter().any(|i| same(i, m))),
            (AllOf, Operand::List(items)) => {
                let ms = members(v);
                items.iter().all(|i| ms.iter().any(|m| same(i, m)))
            }
            _ => false,
        }
    };
    match c.operator {
        Exists | IsNotNull => present(record, &c.field),
        NotExists | IsNull => !present(record, &c.field),
        Ne => !positive(Eq),
        NotBetween => !positive(Between),
        NotContains => !positive(Contains),
        NotIn => !positive(In),
        NoneOf => !positive(AnyOf),
        op => positive(op),
    }
}

fn reference(expr: &FilterExpression, record: &Value) -> bool {
    match expr {
        FilterExpression::Condition(c) => reference_condition(c, record),
        FilterExpression::Group { logic, children } => {
            let mut results = children.iter().map(|child| reference(child, record));
            match logic {
                GroupLogic::And => results.all(|r| r),
                GroupLogic::Or => results.any(|r| r),
                GroupLogic::Not => !results.any(|r| r),
            }
        }
    }
}

// --- Generators ---

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::sample::select(vec!["alpha", "beta", "Gamma", "delta"]).prop_map(Value::from),
        (0i64..5).prop_map(Value::from),
        prop::sample::select(vec![0.5f64, 1.0, 2.5]).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

fn field_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        Just(None),
        Just(Some(Value::Null)),
        scalar().prop_map(Some),
        prop::collection::vec(scalar(), 0..4).prop_map(|v| Some(Value::Array(v))),
    ]
}

fn record() -> impl Strategy<Value = Value> {
    (field_value(), field_value(), field_value(), field_value(), any::<bool>()).prop_map(
        |(category, score, tags, team, meta_is_object)| {
            let mut root = Map::new();
            for (key, value) in [("category", category), ("score", score), ("tags", tags)] {
                if let Some(value) = value {
                    root.insert(key.to_string(), value);
                }
            }
            if meta_is_object {
                let mut meta = Map::new();
                if let Some(team) = team {
                    meta.insert("team".to_string(), team);
                }
                root.insert("meta".to_string(), Value::Object(meta));
            } else if let Some(team) = team {
                root.insert("meta".to_string(), team);
            }
            Value::Object(root)
        },
    )
}

fn condition() -> impl Strategy<Value = FilterExpression> {
    use FilterOperator::*;
    let field = prop::sample::select(vec!["category", "score", "tags", "meta", "meta.team"]);
    let op = prop::sample::select(FilterOperator::ALL.to_vec());
    let pattern = prop::sample::select(PATTERNS.to_vec()).prop_map(Value::from);
    let text = prop::sample::select(vec!["al", "a", "ta", "Ga", "ga"]).prop_map(Value::from);
    let number = (0i64..5).prop_map(Value::from);
    let ordered_value = prop_oneof![number, text.clone()];
    let pair = prop_oneof![
        (0i64..3, 2i64..5).prop_map(|(lo, hi)| (json!(lo), json!(hi))),
        Just((json!("alpha"), json!("c"))),
    ];
    let list = prop::collection::vec(scalar(), 0..3);

    (field, op, ordered_value, pair, list, scalar(), text, pattern, any::<bool>()).prop_map(
        |(field, op, ord, (lo, hi), list, scalar, text, pattern, case_sensitive)| {
            let operand = match op {
                Eq | Ne => Operand::Scalar(scalar),
                Gt | Gte | Lt | Lte => Operand::Scalar(ord),
                Between | NotBetween => Operand::Pair(lo, hi),
                Contains | NotContains | StartsWith | EndsWith => Operand::Scalar(text),
                Regex => Operand::Scalar(pattern),
                In | NotIn | AnyOf | AllOf | NoneOf => Operand::List(list),
                _ => Operand::None,
            };
            FilterExpression::Condition(Condition::new(field, op, operand).case_sensitive(case_sensitive))
        },
    )
}

fn expression() -> impl Strategy<Value = FilterExpression> {
    condition().prop_recursive(4, 24, 4, |inner| {
        (
            prop::sample::select(vec![GroupLogic::And, GroupLogic::Or, GroupLogic::Not]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(logic, children)| FilterExpression::Group { logic, children })
    })
}

proptest! {
    #[test]
    fn evaluate_agrees_with_reference(expr in expression(), record in record()) {
        let actual = evaluate(&expr, &record).unwrap();
        prop_assert_eq!(actual, reference(&expr, &record), "expr: {:?}\nrecord: {}", expr, record);
    }

    #[test]
    fn relational_compile_accepts_what_evaluate_accepts(expr in expression()) {
        let compiled = compile(&expr, Dialect::Relational).unwrap();
        let placeholders = compiled.text().matches('$').count();
        prop_assert_eq!(placeholders, compiled.params().len());
        for n in 1..=placeholders {
            let placeholder = format!("${n}");
            prop_assert!(compiled.text().contains(&placeholder));
        }
    }

    #[test]
    fn validation_errors_agree(
        field in prop::sample::select(vec!["ok", "bad..path", "1x", "meta.team"]),
        op in prop::sample::select(FilterOperator::ALL.to_vec()),
        operand in prop_oneof![
            Just(Operand::None),
            scalar().prop_map(Operand::Scalar),
            Just(Operand::Scalar(Value::Null)),
            Just(Operand::Pair(json!(1), json!("z"))),
            Just(Operand::Pair(json!(1), json!(2))),
            prop::collection::vec(scalar(), 0..3).prop_map(Operand::List),
        ],
    ) {
        let expr = FilterExpression::condition(field, op, operand);
        let record = json!({"ok": 1, "meta": {"team": "x"}});
        prop_assert_eq!(
            evaluate(&expr, &record).is_err(),
            compile(&expr, Dialect::Relational).is_err()
        );
    }

    #[test]
    fn not_is_negated_or(children in prop::collection::vec(condition(), 0..4), record in record()) {
        let not = FilterExpression::not(children.clone());
        let or = FilterExpression::or(children);
        prop_assert_eq!(evaluate(&not, &record).unwrap(), !evaluate(&or, &record).unwrap());
    }
}
