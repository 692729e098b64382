// Archivo: criteria.rs
// Propósito: filtros tipados por campo y `Specification<T>`, la conjunción de
// predicados que reciben los stores en `find_all`/`count`.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filtro de igualdad/pertenencia sobre un campo opcional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter<T> {
    pub equals: Option<T>,
    pub not_equals: Option<T>,
    /// `Some(true)`: el campo debe tener valor; `Some(false)`: debe faltar.
    pub specified: Option<bool>,
    #[serde(rename = "in")]
    pub in_list: Option<Vec<T>>,
    pub not_in: Option<Vec<T>>,
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self { equals: None, not_equals: None, specified: None, in_list: None, not_in: None }
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn equals(value: T) -> Self {
        Self { equals: Some(value), ..Self::default() }
    }

    pub fn one_of(values: Vec<T>) -> Self {
        Self { in_list: Some(values), ..Self::default() }
    }

    pub fn specified(flag: bool) -> Self {
        Self { specified: Some(flag), ..Self::default() }
    }

    pub fn matches(&self, value: Option<&T>) -> bool {
        if let Some(flag) = self.specified {
            if flag != value.is_some() {
                return false;
            }
        }
        if let Some(eq) = &self.equals {
            if value != Some(eq) {
                return false;
            }
        }
        if let Some(ne) = &self.not_equals {
            if value == Some(ne) {
                return false;
            }
        }
        if let Some(list) = &self.in_list {
            if !value.is_some_and(|v| list.contains(v)) {
                return false;
            }
        }
        if let Some(list) = &self.not_in {
            if value.is_some_and(|v| list.contains(v)) {
                return false;
            }
        }
        true
    }
}

/// Filtro con comparaciones de orden además de igualdad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter<T> {
    #[serde(flatten)]
    pub base: Filter<T>,
    pub greater_than: Option<T>,
    pub greater_than_or_equal: Option<T>,
    pub less_than: Option<T>,
    pub less_than_or_equal: Option<T>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self { base: Filter::default(),
               greater_than: None,
               greater_than_or_equal: None,
               less_than: None,
               less_than_or_equal: None }
    }
}

impl<T: PartialOrd> RangeFilter<T> {
    pub fn equals(value: T) -> Self {
        Self { base: Filter::equals(value), ..Self::default() }
    }

    /// Intervalo cerrado `[min, max]`.
    pub fn between(min: T, max: T) -> Self {
        Self { greater_than_or_equal: Some(min), less_than_or_equal: Some(max), ..Self::default() }
    }

    pub fn greater_than(value: T) -> Self {
        Self { greater_than: Some(value), ..Self::default() }
    }

    pub fn less_than(value: T) -> Self {
        Self { less_than: Some(value), ..Self::default() }
    }

    pub fn matches(&self, value: Option<&T>) -> bool {
        if !self.base.matches(value) {
            return false;
        }
        let bounds: [(&Option<T>, fn(&T, &T) -> bool); 4] = [(&self.greater_than, |v, b| v > b),
                                                              (&self.greater_than_or_equal, |v, b| v >= b),
                                                              (&self.less_than, |v, b| v < b),
                                                              (&self.less_than_or_equal, |v, b| v <= b)];
        bounds.iter().all(|(bound, cmp)| match bound {
                         Some(b) => value.is_some_and(|v| cmp(v, b)),
                         None => true,
                     })
    }
}

/// Filtro de texto; `contains` no distingue mayúsculas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    #[serde(flatten)]
    pub base: Filter<String>,
    pub contains: Option<String>,
    pub does_not_contain: Option<String>,
}

impl StringFilter {
    pub fn equals(value: impl Into<String>) -> Self {
        Self { base: Filter::equals(value.into()), ..Self::default() }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self { contains: Some(value.into()), ..Self::default() }
    }

    pub fn does_not_contain(value: impl Into<String>) -> Self {
        Self { does_not_contain: Some(value.into()), ..Self::default() }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        let owned = value.map(str::to_string);
        if !self.base.matches(owned.as_ref()) {
            return false;
        }
        let lower = value.map(str::to_lowercase);
        if let Some(needle) = &self.contains {
            if !lower.as_deref().is_some_and(|v| v.contains(&needle.to_lowercase())) {
                return false;
            }
        }
        if let Some(needle) = &self.does_not_contain {
            if lower.as_deref().is_some_and(|v| v.contains(&needle.to_lowercase())) {
                return false;
            }
        }
        true
    }
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Conjunción de predicados sobre `T`. Sin predicados acepta todo.
pub struct Specification<T> {
    predicates: Vec<Predicate<T>>,
}

impl<T> Specification<T> {
    pub fn all() -> Self {
        Self { predicates: Vec::new() }
    }

    pub fn and(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn is_satisfied_by(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specification({} predicados)", self.predicates.len())
    }
}
