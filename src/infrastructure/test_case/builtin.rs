//! Built-in category classification dataset
//!
//! Cases are grouped the way they are reviewed: exact matches, generic and
//! specific product types, brands, ambiguous terms, multi-category products,
//! attribute-only edge cases, queries with extra filters and semantic
//! paraphrases.

use crate::domain::test_case::{QueryType, TestCase, TestCaseRegistry, TestCaseValidationError};

/// Marker carried by the quick benchmark subset
pub const BENCHMARK_MARKER: &str = "benchmark";

/// Number of leading cases in the benchmark subset
const BENCHMARK_SIZE: usize = 5;

/// The built-in cases, in registry order
pub fn builtin_test_cases() -> Vec<TestCase> {
    use QueryType::*;

    let cases = vec![
        // Exact match
        TestCase::filtered("Ansell gloves ANS 5789911", ExactMatch, "Gloves", 0.7).with_notes(
            "Real product example: should prioritize the exact SKU match even if other categories have more results",
        ),
        // Generic
        TestCase::filtered("nitrile gloves", Generic, "Gloves", 0.8)
            .with_notes("Generic product type, should have very high confidence"),
        TestCase::filtered("pipettes", Generic, "Pipettes", 0.8)
            .with_notes("Simple product category, clear intent"),
        TestCase::filtered("microscope slides", Generic, "Slides", 0.7)
            .with_alternatives(["Microscopy", "Slides & Coverslips"])
            .with_notes("Common lab equipment, should map to the slides category"),
        TestCase::filtered("lab coats", Generic, "Lab Coats", 0.7)
            .with_alternatives(["Safety Equipment", "Apparel"])
            .with_notes("Standard lab safety equipment"),
        // Specific
        TestCase::filtered("blue nitrile gloves size medium", Specific, "Gloves", 0.7)
            .with_notes("Specific attributes but still clearly in the gloves category"),
        TestCase::filtered("sterile surgical gloves", Specific, "Gloves", 0.7)
            .with_alternatives(["Surgical Supplies"])
            .with_notes("Specific type of gloves with medical context"),
        TestCase::filtered("1000μL adjustable pipette", Specific, "Pipettes", 0.7)
            .with_notes("Specific volume and type, clearly pipettes"),
        // Brand
        TestCase::unfiltered("Mercedes Scientific", Brand, 0.0).with_notes(
            "Brand name alone should not apply a category filter (products span many categories)",
        ),
        TestCase::unfiltered("Yamato", Brand, 0.3).with_notes(
            "Brand with products in many categories (accessories, water purifiers, ...)",
        ),
        TestCase::filtered("Thermo Fisher pipettes", Brand, "Pipettes", 0.6)
            .with_notes("Brand plus product type should detect the category"),
        // Ambiguous
        TestCase::unfiltered("filters", Ambiguous, 0.4)
            .with_alternatives(["Water Purifiers", "Lab Equipment", "Filtration"])
            .with_notes("Could be water filters, air filters, pipette filters, ..."),
        TestCase::unfiltered("tubes", Ambiguous, 0.5)
            .with_alternatives(["Test Tubes", "Centrifuge", "Storage"])
            .with_notes("Could be test tubes, centrifuge tubes, storage tubes, ..."),
        TestCase::unfiltered("containers", Ambiguous, 0.4)
            .with_alternatives(["Storage", "Labware", "Containers"])
            .with_notes("Very broad: storage, sample or chemical containers"),
        // Multi-category
        TestCase::filtered("safety goggles", MultiCategory, "Safety Equipment", 0.6)
            .with_alternatives(["PPE", "Lab Supplies", "Eye Protection"])
            .with_notes("Could be in Safety Equipment, Lab Supplies or PPE"),
        TestCase::filtered("autoclave sterilization bags", MultiCategory, "Sterilization", 0.6)
            .with_alternatives(["Bags", "Autoclave Supplies", "Biohazard"])
            .with_notes("Could be in Sterilization, Bags or Autoclave Supplies"),
        // Attribute-only edge cases
        TestCase::unfiltered("clear", Ambiguous, 0.0)
            .with_notes("Color attribute, not a product type"),
        TestCase::unfiltered("large", Ambiguous, 0.0)
            .with_notes("Size attribute, not a product type"),
        TestCase::unfiltered("sterile", Ambiguous, 0.0)
            .with_notes("Property attribute, could apply to many product types"),
        TestCase::unfiltered("products under $50", Ambiguous, 0.0)
            .with_notes("Price filter only, no category intent"),
        // Category plus other filters
        TestCase::filtered("gloves under $50", Specific, "Gloves", 0.7)
            .with_notes("Category plus price filter should still detect the category"),
        TestCase::filtered("pipettes in stock between $100 and $500", Specific, "Pipettes", 0.7)
            .with_notes("Category plus stock and price range"),
        TestCase::filtered("Mercedes Scientific nitrile gloves size medium", Specific, "Gloves", 0.7)
            .with_notes("Brand plus category plus size should prioritize the category"),
        // Semantic similarity
        TestCase::filtered("hand protection", Generic, "Gloves", 0.6)
            .with_alternatives(["Safety Equipment", "PPE"])
            .with_notes("Semantic match to gloves"),
        TestCase::filtered("liquid transfer tools", Generic, "Pipettes", 0.6)
            .with_alternatives(["Lab Equipment", "Liquid Handling"])
            .with_notes("Semantic match to pipettes"),
        TestCase::filtered("specimen viewing equipment", Generic, "Microscopes", 0.5)
            .with_alternatives(["Microscopy", "Slides"])
            .with_notes("Semantic match to microscopes"),
    ];

    cases
        .into_iter()
        .enumerate()
        .map(|(i, case)| {
            if i < BENCHMARK_SIZE {
                case.with_marker(BENCHMARK_MARKER)
            } else {
                case
            }
        })
        .collect()
}

/// Registry over the built-in cases
pub fn builtin_registry() -> Result<TestCaseRegistry, TestCaseValidationError> {
    TestCaseRegistry::new(builtin_test_cases())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::Selection;

    #[test]
    fn test_builtin_dataset_is_valid() {
        let registry = builtin_registry().unwrap();

        assert_eq!(registry.len(), 26);
        assert_eq!(registry.get(0).unwrap().query(), "Ansell gloves ANS 5789911");
        assert_eq!(
            registry.get(25).unwrap().query(),
            "specimen viewing equipment"
        );
    }

    #[test]
    fn test_builtin_breakdown() {
        let registry = builtin_registry().unwrap();

        assert_eq!(registry.by_type(QueryType::ExactMatch).len(), 1);
        assert_eq!(registry.by_type(QueryType::Generic).len(), 7);
        assert_eq!(registry.by_type(QueryType::Specific).len(), 6);
        assert_eq!(registry.by_type(QueryType::Brand).len(), 3);
        assert_eq!(registry.by_type(QueryType::Ambiguous).len(), 7);
        assert_eq!(registry.by_type(QueryType::MultiCategory).len(), 2);
        assert_eq!(registry.requiring_filter().len(), 17);
        assert_eq!(registry.not_requiring_filter().len(), 9);
    }

    #[test]
    fn test_benchmark_marker_on_first_five() {
        let registry = builtin_registry().unwrap();
        let selection = Selection::parse(None, Some(BENCHMARK_MARKER)).unwrap();
        let selected = registry.select(&selection);

        let indices: Vec<usize> = selected.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_ambiguous_cases_expect_no_filter() {
        let registry = builtin_registry().unwrap();

        for case in registry.by_type(QueryType::Ambiguous) {
            assert!(!case.should_apply_filter(), "{}", case.query());
            assert_eq!(case.expected_category(), None);
        }
    }
}
