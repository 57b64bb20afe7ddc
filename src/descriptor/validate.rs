//! Descriptor validation.
//!
//! Runs every table check and accumulates all violations with Stillwater's
//! `Validation` instead of stopping at the first one, so a broken table is
//! reported in one pass.

use super::{Descriptor, Machine};
use crate::core::{Directive, State};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A defect in a machine's declared tables.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorViolation {
    #[error("machine name is empty")]
    EmptyName,

    #[error("max_states is {declared} but the state type has {actual} states")]
    StateCountMismatch { declared: usize, actual: usize },

    #[error("state table has {len} entries, expected {expected}")]
    TableLength { len: usize, expected: usize },

    #[error("transition map for '{event}' has {len} entries, expected {expected}")]
    EventMapLength {
        event: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("transition map for '{event}' targets state index {index} (max {max})")]
    TargetOutOfRange {
        event: &'static str,
        index: usize,
        max: usize,
    },

    #[error("state entry name '{name}' is used more than once")]
    DuplicateStateName { name: &'static str },
}

type Check = Validation<(), NonEmptyVec<DescriptorViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> DescriptorViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Check a descriptor's tables, accumulating ALL violations.
pub fn validate<M: Machine>(descriptor: &Descriptor<M>) -> Check {
    let max = descriptor.max_states();
    let mut checks: Vec<Check> = Vec::new();

    checks.push(check(!descriptor.name().is_empty(), || {
        DescriptorViolation::EmptyName
    }));

    let actual = <M::State as State>::COUNT;
    checks.push(check(max == actual, || {
        DescriptorViolation::StateCountMismatch {
            declared: max,
            actual,
        }
    }));

    let len = descriptor.table().len();
    checks.push(check(len == max, || DescriptorViolation::TableLength {
        len,
        expected: max,
    }));

    let mut seen = HashSet::new();
    for index in 0..len {
        if let Some(name) = descriptor.table().entry_name(index) {
            checks.push(check(seen.insert(name), || {
                DescriptorViolation::DuplicateStateName { name }
            }));
        }
    }

    for event in descriptor.events() {
        let map = event.map();
        checks.push(check(map.len() == max, || {
            DescriptorViolation::EventMapLength {
                event: event.name(),
                len: map.len(),
                expected: max,
            }
        }));

        for directive in map {
            if let Directive::Transition(target) = directive {
                let index = target.index();
                checks.push(check(index < max, || {
                    DescriptorViolation::TargetOutOfRange {
                        event: event.name(),
                        index,
                        max,
                    }
                }));
            }
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use crate::descriptor::{BasicEntry, ExtendedEntry};
    use crate::engine::Ctx;

    crate::state_enum! {
        enum Light {
            Red,
            Green,
            Amber,
        }
    }

    struct Signal;

    impl Machine for Signal {
        type State = Light;
        type Data = ();
        type Context = ();
    }

    fn noop(_ctx: &mut Ctx<'_, Signal>, _data: Option<&()>) {}

    static TABLE: [BasicEntry<Signal>; 3] = [
        BasicEntry::new("Red", noop),
        BasicEntry::new("Green", noop),
        BasicEntry::new("Amber", noop),
    ];

    static SHORT_TABLE: [ExtendedEntry<Signal>; 2] = [
        ExtendedEntry::new("Red", noop),
        ExtendedEntry::new("Red", noop),
    ];

    const NEXT_MAP: [Directive<Light>; <Light as State>::COUNT] = [
        Directive::Transition(Light::Green),
        Directive::Transition(Light::Amber),
        Directive::Transition(Light::Red),
    ];

    static NEXT: Event<Light> = Event::new("Next", &NEXT_MAP);
    static BROKEN: Event<Light> = Event::new("Broken", &[Directive::Ignored]);

    static GOOD_EVENTS: [&Event<Light>; 1] = [&NEXT];
    static BAD_EVENTS: [&Event<Light>; 2] = [&NEXT, &BROKEN];

    static GOOD: Descriptor<Signal> = Descriptor::basic("Signal", 3, &TABLE, &GOOD_EVENTS);
    static BAD: Descriptor<Signal> = Descriptor::extended("", 4, &SHORT_TABLE, &BAD_EVENTS);

    #[test]
    fn valid_descriptor_passes() {
        assert!(validate(&GOOD).is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        match validate(&BAD) {
            Validation::Failure(errors) => {
                let errors: Vec<_> = errors.iter().cloned().collect();
                assert!(errors.contains(&DescriptorViolation::EmptyName));
                assert!(errors.contains(&DescriptorViolation::StateCountMismatch {
                    declared: 4,
                    actual: 3,
                }));
                assert!(errors.contains(&DescriptorViolation::TableLength {
                    len: 2,
                    expected: 4,
                }));
                assert!(errors.contains(&DescriptorViolation::DuplicateStateName { name: "Red" }));
                assert!(errors.contains(&DescriptorViolation::EventMapLength {
                    event: "Next",
                    len: 3,
                    expected: 4,
                }));
                assert!(errors.contains(&DescriptorViolation::EventMapLength {
                    event: "Broken",
                    len: 1,
                    expected: 4,
                }));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }
}
