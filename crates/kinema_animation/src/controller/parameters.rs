use rustc_hash::FxHashMap;

/// A declared boolean parameter and its authoring default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub default: bool,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            default,
        }
    }
}

/// Brings a runtime snapshot in line with the declared parameter set.
///
/// Values of parameters that are still declared are kept, new ones take
/// their default, undeclared ones are dropped.
pub(crate) fn resync(snapshot: &mut FxHashMap<String, bool>, declared: &[Parameter]) {
    snapshot.retain(|name, _| declared.iter().any(|p| &p.name == name));
    for parameter in declared {
        snapshot
            .entry(parameter.name.clone())
            .or_insert(parameter.default);
    }
}

/// A fresh snapshot holding every default.
pub(crate) fn seed(declared: &[Parameter]) -> FxHashMap<String, bool> {
    declared
        .iter()
        .map(|p| (p.name.clone(), p.default))
        .collect()
}
