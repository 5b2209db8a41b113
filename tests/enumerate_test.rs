mod common;

use std::collections::HashSet;

use common::*;
use vizspec::{
    enumerate, AggFn, EnumerationConfig, FieldId, FieldSchema, FieldSet, GeneratingProcedure,
    RecommendationType, SpecArgs, SpecCandidate, VizType,
};

const ALL_TYPES: [RecommendationType; 4] = [
    RecommendationType::Baseline,
    RecommendationType::Subset,
    RecommendationType::Exact,
    RecommendationType::Expanded,
];

fn run(fields: &FieldSet, selected: &[u64], types: &[RecommendationType]) -> Vec<SpecCandidate> {
    let selected: Vec<FieldId> = selected.iter().copied().map(FieldId).collect();
    enumerate(fields, &selected, types, &EnumerationConfig::default()).unwrap()
}

#[test]
fn test_single_categorical_baseline() {
    let fields = FieldSet::new(vec![FieldSchema::categorical(1, "dept")]).unwrap();
    let candidates = run(&fields, &[], &[RecommendationType::Baseline]);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].generating_procedure, GeneratingProcedure::ValueCount);
    assert!(candidates[0].viz_types.contains(&VizType::Bar));
}

#[test]
fn test_continuous_quantitative_baseline() {
    let fields = FieldSet::new(vec![FieldSchema::quantitative(1, "age")]).unwrap();
    let candidates = run(&fields, &[], &[RecommendationType::Baseline]);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].generating_procedure, GeneratingProcedure::BinAggregate);
    assert_eq!(candidates[0].args.agg_fn(), Some(AggFn::Count));
    assert!(candidates[0].viz_types.contains(&VizType::Hist));
}

#[test]
fn test_exact_categorical_quantitative_has_box() {
    let fields = FieldSet::new(vec![
        FieldSchema::categorical(1, "dept"),
        FieldSchema::quantitative(2, "salary"),
    ])
    .unwrap();
    let candidates = run(&fields, &[1, 2], &[RecommendationType::Exact]);

    let boxes: Vec<_> = candidates
        .iter()
        .filter(|c| c.generating_procedure == GeneratingProcedure::ValueBox)
        .collect();
    assert_eq!(boxes.len(), 1);
    assert_eq!(
        boxes[0].args,
        SpecArgs::ValueBox {
            group: FieldId(1),
            value: FieldId(2)
        }
    );
}

#[test]
fn test_exact_two_continuous_single_scatter() {
    let fields = FieldSet::new(vec![
        FieldSchema::quantitative(1, "x"),
        FieldSchema::quantitative(2, "y"),
    ])
    .unwrap();
    let candidates = run(&fields, &[1, 2], &[RecommendationType::Exact]);

    let scatter: Vec<_> = candidates
        .iter()
        .filter(|c| c.generating_procedure == GeneratingProcedure::ValueValue)
        .collect();
    assert_eq!(scatter.len(), 1);
    assert_eq!(scatter[0].field_ids, vec![FieldId(1), FieldId(2)]);
    assert!(scatter[0].viz_types.contains(&VizType::Scatter));
}

#[test]
fn test_referential_closure() {
    let fields = hr_fields();
    let selections: [&[u64]; 4] = [&[], &[DEPT], &[DEPT, SALARY, HIRED], &[SALARY, AGE, YEAR]];

    for selected in selections {
        for candidate in run(&fields, selected, &ALL_TYPES) {
            assert!(!candidate.viz_types.is_empty());
            for id in &candidate.field_ids {
                assert!(fields.contains(*id), "{} references unknown {}", candidate.generating_procedure, id);
            }
        }
    }
}

#[test]
fn test_id_fields_never_enumerated() {
    let fields = hr_fields();
    let candidates = run(&fields, &[DEPT, SALARY, EMPLOYEE_ID], &ALL_TYPES);
    assert!(!candidates.is_empty());
    assert!(candidates
        .iter()
        .all(|c| !c.field_ids.contains(&FieldId(EMPLOYEE_ID))));
}

#[test]
fn test_selecting_only_id_fields_yields_nothing() {
    let fields = hr_fields();
    let candidates = run(&fields, &[EMPLOYEE_ID], &ALL_TYPES);
    assert!(candidates.is_empty());

    // An empty selection still covers every non-id field
    let all = run(&fields, &[], &[RecommendationType::Baseline]);
    assert!(!all.is_empty());
}

#[test]
fn test_dedup_idempotence() {
    let fields = hr_fields();
    let selected = [DEPT, SITE, SALARY, AGE];

    let first = run(&fields, &selected, &ALL_TYPES);
    let second = run(&fields, &selected, &ALL_TYPES);

    let first_set: HashSet<SpecCandidate> = first.iter().cloned().collect();
    let second_set: HashSet<SpecCandidate> = second.iter().cloned().collect();
    assert_eq!(first_set.len(), first.len(), "duplicate candidates emitted");
    assert_eq!(first_set, second_set);
}

#[test]
fn test_aggregation_functions_from_config() {
    let fields = hr_fields();
    let config = EnumerationConfig {
        aggregation_functions: vec![AggFn::Median],
    };
    let candidates = enumerate(
        &fields,
        &[FieldId(DEPT), FieldId(SALARY)],
        &[RecommendationType::Exact],
        &config,
    )
    .unwrap();

    let aggregated: Vec<AggFn> = candidates.iter().filter_map(|c| c.args.agg_fn()).collect();
    assert_eq!(aggregated, vec![AggFn::Median]);
}

#[test]
fn test_candidates_carry_descriptions() {
    let fields = hr_fields();
    let candidates = run(&fields, &[DEPT, HIRED], &[RecommendationType::Exact]);
    assert!(!candidates.is_empty());
    for candidate in &candidates {
        assert!(!candidate.meta.description.is_empty());
        assert!(candidate
            .meta
            .construction
            .iter()
            .any(|token| token.field_id == Some(FieldId(DEPT))));
    }
}
