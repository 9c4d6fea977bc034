use crate::Value;

/// Physical scaling applied to a raw wire value.
///
/// Either absent, a constant multiplier, or an arbitrary function (for
/// instance squaring a square-root-of-semi-major-axis field, or a
/// discontinuous accuracy lookup). All three are evaluated through the
/// single [`Scale::apply`] dispatch point.
#[derive(Debug, Clone, Copy)]
pub enum Scale {
    Identity,
    Linear(f64),
    Func(fn(f64) -> f64),
}

impl PartialEq for Scale {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scale::Identity, Scale::Identity) => true,
            (Scale::Linear(a), Scale::Linear(b)) => a == b,
            (Scale::Func(a), Scale::Func(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl Scale {
    pub fn apply(self, raw: Value) -> Value {
        match self {
            Scale::Identity => raw,
            Scale::Linear(k) => match raw.as_f64() {
                Some(v) => Value::Float(v * k),
                None => raw,
            },
            Scale::Func(f) => match raw.as_f64() {
                Some(v) => Value::Float(f(v)),
                None => raw,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Scale;
    use crate::Value;

    #[test]
    fn scale_dispatch() {
        assert_eq!(Scale::Identity.apply(Value::Int(5)), Value::Int(5));
        assert_eq!(Scale::Linear(0.5).apply(Value::Int(5)), Value::Float(2.5));
        fn square(v: f64) -> f64 {
            v * v
        }
        assert_eq!(Scale::Func(square).apply(Value::Int(3)), Value::Float(9.0));
    }

    #[test]
    fn func_scales_compare_by_address() {
        fn square(v: f64) -> f64 {
            v * v
        }
        fn half(v: f64) -> f64 {
            v / 2.0
        }
        assert_eq!(Scale::Func(square), Scale::Func(square));
        assert_ne!(Scale::Func(square), Scale::Func(half));
        assert_ne!(Scale::Identity, Scale::Linear(1.0));
    }

    #[test]
    fn non_numeric_values_pass_through() {
        let text = Value::Text("ROM".to_string());
        assert_eq!(Scale::Linear(2.0).apply(text.clone()), text);
    }
}
