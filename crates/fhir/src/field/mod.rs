//! Field translators.
//!
//! Scalar and enum concepts are translated through immutable tables rather than branching
//! code. A table is a closed list of `(domain, wire)` pairs:
//! - a domain value missing from the table, and the domain "no value", map to `None`,
//! - a wire code missing from the table maps to `None`.
//!
//! Neither direction ever falls back to an arbitrary default.

pub mod concept;
pub mod mappings;

use crate::datatypes::{CodeableConcept, Coding};

/// Table between a domain enum and a wire enum (or bare wire code).
pub struct CodeMapping<D: 'static, W: 'static> {
    entries: &'static [(D, W)],
}

impl<D, W> CodeMapping<D, W>
where
    D: Copy + PartialEq + 'static,
    W: Copy + PartialEq + 'static,
{
    pub const fn new(entries: &'static [(D, W)]) -> Self {
        Self { entries }
    }

    pub fn to_wire(&self, value: Option<D>) -> Option<W> {
        let value = value?;
        self.entries
            .iter()
            .find(|(domain, _)| *domain == value)
            .map(|(_, wire)| *wire)
    }

    pub fn to_domain(&self, value: Option<W>) -> Option<D> {
        let value = value?;
        self.entries
            .iter()
            .find(|(_, wire)| *wire == value)
            .map(|(domain, _)| *domain)
    }
}

impl<D> CodeMapping<D, &'static str>
where
    D: Copy + PartialEq + 'static,
{
    /// As [`CodeMapping::to_domain`], for a code borrowed from a parsed resource.
    pub fn from_code(&self, code: Option<&str>) -> Option<D> {
        let code = code?;
        self.entries
            .iter()
            .find(|(_, wire)| *wire == code)
            .map(|(domain, _)| *domain)
    }
}

/// Table between a domain enum and codes of one coding system.
///
/// Entries are `(domain value, code, display)`.
pub struct CodingMapping<D: 'static> {
    system: &'static str,
    entries: &'static [(D, &'static str, &'static str)],
}

impl<D> CodingMapping<D>
where
    D: Copy + PartialEq + 'static,
{
    pub const fn new(
        system: &'static str,
        entries: &'static [(D, &'static str, &'static str)],
    ) -> Self {
        Self { system, entries }
    }

    pub fn system(&self) -> &'static str {
        self.system
    }

    pub fn to_coding(&self, value: Option<D>) -> Option<Coding> {
        let value = value?;
        self.entries
            .iter()
            .find(|(domain, _, _)| *domain == value)
            .map(|(_, code, display)| Coding::new(self.system, code, display))
    }

    pub fn to_codeable_concept(&self, value: Option<D>) -> Option<CodeableConcept> {
        self.to_coding(value).map(CodeableConcept::from_coding)
    }

    /// Map a coding back to the domain.
    ///
    /// A coding from another system never matches. A coding without a system is matched on
    /// its code alone.
    pub fn from_coding(&self, coding: &Coding) -> Option<D> {
        if coding.system.as_deref().is_some_and(|s| s != self.system) {
            return None;
        }
        let code = coding.code.as_deref()?;
        self.entries
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(domain, _, _)| *domain)
    }

    /// The domain value of the first coding that maps.
    pub fn from_codeable_concept(&self, concept: Option<&CodeableConcept>) -> Option<D> {
        concept?.coding.iter().find_map(|c| self.from_coding(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Colour {
        Red,
        Green,
        Blue,
    }

    static COLOUR_CODES: CodeMapping<Colour, &str> =
        CodeMapping::new(&[(Colour::Red, "red"), (Colour::Green, "green")]);

    static COLOUR_CODINGS: CodingMapping<Colour> = CodingMapping::new(
        "http://example.org/colour",
        &[(Colour::Red, "R", "Red"), (Colour::Green, "G", "Green")],
    );

    #[test]
    fn absent_and_unmapped_values_give_none() {
        assert_eq!(COLOUR_CODES.to_wire(None), None);
        assert_eq!(COLOUR_CODES.to_wire(Some(Colour::Blue)), None);
        assert_eq!(COLOUR_CODES.to_domain(None), None);
        assert_eq!(COLOUR_CODES.to_domain(Some("purple")), None);
    }

    #[test]
    fn mapped_values_translate_both_ways() {
        assert_eq!(COLOUR_CODES.to_wire(Some(Colour::Green)), Some("green"));
        assert_eq!(COLOUR_CODES.to_domain(Some("red")), Some(Colour::Red));

        let parsed = String::from("green");
        assert_eq!(COLOUR_CODES.from_code(Some(&parsed)), Some(Colour::Green));
        assert_eq!(COLOUR_CODES.from_code(Some("GREEN")), None);
    }

    #[test]
    fn coding_carries_system_code_and_display() {
        let coding = COLOUR_CODINGS
            .to_coding(Some(Colour::Red))
            .expect("mapped colour");
        assert_eq!(coding, Coding::new("http://example.org/colour", "R", "Red"));
        assert!(COLOUR_CODINGS.to_coding(Some(Colour::Blue)).is_none());
    }

    #[test]
    fn coding_from_other_system_does_not_match() {
        let foreign = Coding::new("http://example.org/other", "R", "Red");
        assert_eq!(COLOUR_CODINGS.from_coding(&foreign), None);

        let systemless = Coding {
            code: Some("G".into()),
            ..Default::default()
        };
        assert_eq!(COLOUR_CODINGS.from_coding(&systemless), Some(Colour::Green));
    }

    #[test]
    fn codeable_concept_uses_first_mapped_coding() {
        let concept = CodeableConcept {
            coding: vec![
                Coding::new("http://example.org/other", "R", "Red"),
                Coding::new("http://example.org/colour", "unknown", "?"),
                Coding::new("http://example.org/colour", "G", "Green"),
            ],
            text: None,
        };
        assert_eq!(
            COLOUR_CODINGS.from_codeable_concept(Some(&concept)),
            Some(Colour::Green)
        );
        assert_eq!(COLOUR_CODINGS.from_codeable_concept(None), None);
    }
}
