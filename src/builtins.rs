// ABOUTME: Host extension point — the core never defines its own built-ins,
// ABOUTME: it only exposes the hook a host uses to install them (spec §6).

use crate::env::Environment;
use crate::value::{HostFn, Value};
use std::rc::Rc;

/// Installs `name` as a callable bound to `f` in `env`. The core library
/// ships with nothing registered — `print`, `readInt`, and friends are
/// entirely a host concern (spec §1 "Host responsibilities").
pub fn register_builtin(env: &Rc<Environment>, name: &str, f: HostFn) {
    env.define(name, Value::BuiltIn(f));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RuntimeError, ARITY_ONE};

    #[test]
    fn registered_builtin_is_callable_from_the_environment() {
        let env = Environment::new();
        register_builtin(
            &env,
            "double",
            Rc::new(|args: &[Value]| match args {
                [Value::Int(n)] => Ok(Value::Int(n * 2)),
                _ => Err(RuntimeError::arity_error(ARITY_ONE, args.len())),
            }),
        );

        match env.lookup("double") {
            Ok(Value::BuiltIn(f)) => {
                assert!(matches!(f(&[Value::Int(21)]), Ok(Value::Int(42))));
            }
            other => panic!("expected a registered builtin, got {:?}", other),
        }
    }
}
