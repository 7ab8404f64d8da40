use std::path::Path;

use super::*;

fn listing(id: &str, category: Category, municipality: &str) -> LocatedListing {
    LocatedListing {
        id: id.to_string(),
        display_title: format!("Listing {id}"),
        category,
        municipality: municipality.to_string(),
        state: "MT".to_string(),
        region: None,
        price_minor: Some(10_000),
        unit: None,
        thumbnail_url: None,
    }
}

#[test]
fn parses_minimal_listing_with_title_alias() {
    let yaml = r#"
listings:
  - id: "a"
    title: "Fazenda A"
    category: fazendas
    municipality: "Sorriso"
    state: "MT"
"#;
    let file: ListingsFile = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(file.listings.len(), 1);
    let l = &file.listings[0];
    assert_eq!(l.display_title, "Fazenda A");
    assert_eq!(l.category, Category::Fazendas);
    assert!(l.region.is_none());
    assert!(l.price_minor.is_none());
}

#[test]
fn validate_rejects_duplicate_id() {
    let file = ListingsFile {
        listings: vec![
            listing("x", Category::Graos, "Rio Verde"),
            listing("x", Category::Graos, "Jataí"),
        ],
    };
    let err = validate_listings(&file).unwrap_err();
    assert!(err.to_string().contains("duplicate listing id"));
}

#[test]
fn validate_rejects_empty_municipality() {
    let file = ListingsFile {
        listings: vec![listing("x", Category::Graos, "  ")],
    };
    let err = validate_listings(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("municipality")));
}

#[test]
fn validate_rejects_negative_price() {
    let mut l = listing("x", Category::Maquinas, "Sorriso");
    l.price_minor = Some(-1);
    let err = validate_listings(&ListingsFile { listings: vec![l] }).unwrap_err();
    assert!(err.to_string().contains("negative price"));
}

#[test]
fn validate_accepts_valid_listings() {
    let file = ListingsFile {
        listings: vec![
            listing("a", Category::Fazendas, "Sorriso"),
            listing("b", Category::Avioes, "Sinop"),
        ],
    };
    assert!(validate_listings(&file).is_ok());
}

#[test]
fn filter_by_category_keeps_catalog_order() {
    let all = vec![
        listing("a", Category::Fazendas, "Sorriso"),
        listing("b", Category::Graos, "Sinop"),
        listing("c", Category::Fazendas, "Sinop"),
    ];
    let farms = filter_by_category(&all, Some(Category::Fazendas));
    let ids: Vec<_> = farms.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["a", "c"]);
    assert_eq!(filter_by_category(&all, None).len(), 3);
}

#[test]
fn category_round_trips_through_display() {
    for c in [
        Category::Fazendas,
        Category::Maquinas,
        Category::Avioes,
        Category::Graos,
    ] {
        assert_eq!(c.to_string().parse::<Category>(), Ok(c));
    }
    assert_eq!(Category::Maquinas.label(), "Máquinas");
}

#[test]
fn load_listings_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("listings.yaml");
    assert!(
        path.exists(),
        "listings.yaml missing at {path:?}; required for this test"
    );
    let file = load_listings(&path).expect("failed to load listings.yaml");
    assert!(!file.listings.is_empty());
}

#[test]
fn load_listings_reports_missing_file() {
    let err = load_listings(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ListingsFileIo { .. }));
}
