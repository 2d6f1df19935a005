use catalog::domain::graphic::{
    aspect_ratio::{RatioStrategy, STANDARD_RATIOS, closest_standard_ratio, reduced_ratio},
    entity::Catalog,
    value_objects::{CampaignNumber, ImageExtension},
};

#[test]
fn classifier_always_returns_a_table_label() {
    for (w, h) in [(1, 1), (3000, 2000), (7, 1000), (1000, 7), (1366, 768), (0, 5)] {
        let label = closest_standard_ratio(w, h);
        assert!(
            STANDARD_RATIOS.iter().any(|(l, _)| *l == label),
            "{}x{} gave {}",
            w,
            h,
            label
        );
    }
}

#[test]
fn square_and_portrait_formats() {
    assert_eq!(closest_standard_ratio(500, 500), "1:1");
    assert_eq!(closest_standard_ratio(800, 1000), "4:5");
    assert_eq!(closest_standard_ratio(600, 900), "2:3");
}

#[test]
fn reduced_strategy_uses_well_known_names() {
    assert_eq!(reduced_ratio(1280, 800), "16:10");
    assert_eq!(reduced_ratio(1920, 1080), "16:9");
    assert_eq!(reduced_ratio(1000, 300), "10:3");
    assert_eq!(RatioStrategy::Reduced.classify(2560, 1080), "21:9");
}

#[test]
fn campaign_number_format() {
    assert!(CampaignNumber::new("2024-Q1/fb.01".to_string()).is_ok());
    assert!(CampaignNumber::new("-leading-dash".to_string()).is_err());
    assert!(CampaignNumber::new("a".repeat(41)).is_err());
}

#[test]
fn image_extension_content_types() {
    let jpeg = ImageExtension::from_filename("photo.JPEG").unwrap();
    assert_eq!(jpeg.as_str(), "jpeg");
    assert_eq!(jpeg.content_type(), "image/jpeg");
    assert!(ImageExtension::from_filename("vector.svg").is_none());
}

#[test]
fn empty_document_parses_as_empty_catalog() {
    let catalog: Catalog = serde_json::from_str("{}").unwrap();
    assert!(catalog.is_empty());
}
