use bridging_brain::catalogue::{CatalogueImportError, CatalogueImporter};
use bridging_brain::lenders::{resolve_field, CellValue, LenderContact};

const FIXTURE: &[u8] = include_bytes!("fixtures/lender_questionnaire.csv");

#[test]
fn questionnaire_export_imports_named_lenders_in_order() {
    let catalogue = CatalogueImporter::from_reader(FIXTURE).expect("fixture imports");

    let names: Vec<&str> = catalogue.lenders().iter().map(|lender| lender.name()).collect();
    assert_eq!(
        names,
        vec![
            "Atlas Bridging",
            "Beacon Finance",
            "Crown Capital",
            "Delta Lending",
            "Ember Bridging",
            "Forge Funding",
        ]
    );
}

#[test]
fn cleaned_headers_resolve_through_logical_names() {
    let catalogue = CatalogueImporter::from_reader(FIXTURE).expect("fixture imports");
    let atlas = catalogue.find_by_name("atlas").expect("partial match");

    assert_eq!(
        resolve_field(atlas, "1st_charge_residential").map(|value| value.as_text().into_owned()),
        Some("75%".to_string())
    );
    assert_eq!(
        atlas.get("minimum_number_of_months_interest"),
        Some(&CellValue::Number(3.0))
    );
    assert!(atlas.get("max_ltv_bmv_purchases").is_some_and(CellValue::is_blank));

    let delta = catalogue.find_by_name("Delta Lending").expect("exact match");
    assert_eq!(delta.get("lender_notes"), Some(&CellValue::Blank));
    assert!(LenderContact::from_record(delta).is_none());
}

#[test]
fn importer_reads_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/lender_questionnaire.csv");
    let catalogue = CatalogueImporter::from_path(path).expect("fixture imports");
    assert_eq!(catalogue.len(), 6);

    let missing = CatalogueImporter::from_path("/definitely/not/here.csv");
    assert!(matches!(missing, Err(CatalogueImportError::Io(_))));
}

#[test]
fn export_without_a_name_column_is_rejected() {
    let csv = "Minimum loan size,Maximum loan size\n£100k,£1m\n";
    let error = CatalogueImporter::from_reader(csv.as_bytes()).expect_err("no name column");
    assert!(matches!(error, CatalogueImportError::MissingNameColumn));
}
