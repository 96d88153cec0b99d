//! Ternary bindings: `when(condition).then(a).otherwise(b)`.

use crate::binding::Binding;
use crate::observable::Dependency;
use crate::operand::Operand;

/// Start a ternary binding on `condition`.
pub fn when(condition: impl Into<Operand<bool>>) -> When {
    When {
        condition: condition.into(),
    }
}

#[derive(Debug, Clone)]
#[must_use = "a condition does nothing until both branches are given"]
pub struct When {
    condition: Operand<bool>,
}

impl When {
    pub fn then<T: Clone + 'static>(self, value: impl Into<Operand<T>>) -> WhenThen<T> {
        WhenThen {
            condition: self.condition,
            then: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
#[must_use = "a ternary binding is only built by otherwise()"]
pub struct WhenThen<T> {
    condition: Operand<bool>,
    then: Operand<T>,
}

impl<T: Clone + PartialEq + 'static> WhenThen<T> {
    /// The finished binding. Only the selected branch is read on evaluation,
    /// but both observable branches are dependencies.
    pub fn otherwise(self, value: impl Into<Operand<T>>) -> Binding<T> {
        let Self { condition, then } = self;
        let otherwise = value.into();
        let deps: Vec<Dependency> = condition
            .dependency()
            .into_iter()
            .chain(then.dependency())
            .chain(otherwise.dependency())
            .collect();
        Binding::derived(
            move || {
                if condition.get()? {
                    then.get()
                } else {
                    otherwise.get()
                }
            },
            deps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use crate::property::{BooleanProperty, IntegerProperty};

    #[test]
    fn picks_branch_by_condition() {
        let flag = BooleanProperty::new(true);
        let a = IntegerProperty::new(1);
        let b = IntegerProperty::new(2);
        let pick = when(&flag).then(&a).otherwise(&b);
        assert_eq!(pick.dependencies().len(), 3);
        assert_eq!(pick.get().ok(), Some(1));
        flag.set(false);
        assert_eq!(pick.get().ok(), Some(2));
        b.set(5);
        assert_eq!(pick.get().ok(), Some(5));
    }

    #[test]
    fn constant_branches_are_not_dependencies() {
        let flag = BooleanProperty::new(false);
        let label = when(&flag)
            .then(Operand::text("on"))
            .otherwise(Operand::text("off"));
        assert_eq!(label.dependencies().len(), 1);
        assert_eq!(label.get().ok().flatten().as_deref(), Some("off"));
    }

    #[test]
    fn unselected_branch_failure_is_ignored() {
        let failing = Binding::<i32>::new(|| Err(BindingError::invalid("boom")));
        let flag = BooleanProperty::new(true);
        let pick = when(&flag).then(7_i32).otherwise(&failing);
        assert_eq!(pick.get().ok(), Some(7));
        flag.set(false);
        assert!(pick.get().is_err());
    }
}
