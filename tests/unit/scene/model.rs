use super::*;

const FULL: &str = r##"
{
  "bgImg": { "filePath": "bg.png" },
  "compositeItemList": [
    {
      "commonParam": { "type": "image", "depth": 2, "scale": 0.5, "pos": { "x": 50, "y": 25 } },
      "specificParam": { "filePath": "logo.png" }
    },
    {
      "commonParam": {
        "type": "text", "depth": 1, "scale": 2.0, "pos": { "x": 10.5, "y": 90 },
        "align": "center"
      },
      "specificParam": { "text": "Hello\\nWorld", "font": "Arial", "color": "#fff" }
    }
  ],
  "outputImg": { "fileName": "out.png", "size": { "width": 320, "height": 200 } }
}
"##;

#[test]
fn decodes_full_document() {
    let cfg = CompositionConfig::from_json_str(FULL).unwrap();
    assert_eq!(cfg.background.asset_path, PathBuf::from("bg.png"));
    assert_eq!(cfg.output.file_name.as_deref(), Some("out.png"));
    assert_eq!(
        cfg.output.size,
        Some(OutputSize {
            width: 320,
            height: 200
        })
    );
    assert_eq!(cfg.layers.len(), 2);

    let img = &cfg.layers[0];
    assert_eq!(img.depth, 2);
    assert_eq!(img.scale, 0.5);
    assert_eq!(img.opacity, 1.0);
    assert_eq!(img.position, Position::new(50.0, 25.0));
    assert_eq!(
        img.payload,
        LayerPayload::Image {
            asset_path: PathBuf::from("logo.png")
        }
    );

    let txt = &cfg.layers[1];
    assert_eq!(txt.align, Align::Center);
    let LayerPayload::Text { text, font_id, color_hex } = &txt.payload else {
        panic!("expected text payload");
    };
    // JSON "\\n" is the two-character marker, not a line feed.
    assert_eq!(text, "Hello\\nWorld");
    assert!(!text.contains('\n'));
    assert_eq!(font_id, "Arial");
    assert_eq!(color_hex, "#fff");
}

#[test]
fn optional_fields_default() {
    let cfg = CompositionConfig::from_json_str(
        r##"{
          "bgImg": { "filePath": "bg.png" },
          "compositeItemList": [
            { "commonParam": { "type": "image" }, "specificParam": { "filePath": "a.png" } },
            { "commonParam": { "type": "text", "align": "" },
              "specificParam": { "font": "F", "color": "#000" } }
          ]
        }"##,
    )
    .unwrap();

    assert_eq!(cfg.output, OutputSpec::default());
    let a = &cfg.layers[0];
    assert_eq!(a.depth, 0);
    assert_eq!(a.scale, 1.0);
    assert_eq!(a.align, Align::Left);
    assert_eq!(a.scale_mode, ScaleMode::Both);
    let LayerPayload::Text { text, .. } = &cfg.layers[1].payload else {
        panic!("expected text payload");
    };
    assert!(text.is_empty());
    assert_eq!(cfg.layers[1].align, Align::Left);
}

#[test]
fn opacity_and_scale_mode_are_independent_fields() {
    let cfg = CompositionConfig::from_json_str(
        r#"{
          "bgImg": { "filePath": "bg.png" },
          "compositeItemList": [
            { "commonParam": { "type": "image", "scale": 3, "opacity": 0.25, "scaleMode": "width" },
              "specificParam": { "filePath": "a.png" } }
          ]
        }"#,
    )
    .unwrap();
    let item = &cfg.layers[0];
    assert_eq!(item.scale, 3.0);
    assert_eq!(item.opacity, 0.25);
    assert_eq!(item.scale_mode, ScaleMode::Width);
}

#[test]
fn rejects_unknown_type_and_align() {
    for doc in [
        r#"{ "bgImg": { "filePath": "bg.png" },
             "compositeItemList": [ { "commonParam": { "type": "svg" } } ] }"#,
        r##"{ "bgImg": { "filePath": "bg.png" },
             "compositeItemList": [ { "commonParam": { "type": "text", "align": "justify" },
               "specificParam": { "font": "F", "color": "#000" } } ] }"##,
    ] {
        assert!(matches!(
            CompositionConfig::from_json_str(doc),
            Err(CompositeError::ConfigDecode(_))
        ));
    }
}

#[test]
fn rejects_missing_payload_fields() {
    let err = CompositionConfig::from_json_str(
        r#"{ "bgImg": { "filePath": "bg.png" },
             "compositeItemList": [ { "commonParam": { "type": "image" } } ] }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("filePath"));

    let err = CompositionConfig::from_json_str(
        r##"{ "bgImg": { "filePath": "bg.png" },
             "compositeItemList": [ { "commonParam": { "type": "text" },
               "specificParam": { "text": "x", "color": "#000" } } ] }"##,
    )
    .unwrap_err();
    assert!(err.to_string().contains("font"));

    assert!(CompositionConfig::from_json_str(r#"{ "bgImg": { "filePath": "" } }"#).is_err());
}

#[test]
fn rejects_out_of_range_opacity() {
    let err = CompositionConfig::from_json_str(
        r#"{ "bgImg": { "filePath": "bg.png" },
             "compositeItemList": [ { "commonParam": { "type": "image", "opacity": 1.5 },
               "specificParam": { "filePath": "a.png" } } ] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, CompositeError::ConfigDecode(_)));
}

#[test]
fn builder_matches_decoded_form() {
    let built = CompositionConfig::new("bg.png")
        .layer(CompositeItem::image("logo.png").depth(2).scale(0.5).at(50.0, 25.0))
        .layer(
            CompositeItem::text("Hello\\nWorld", "Arial", "#fff")
                .depth(1)
                .scale(2.0)
                .at(10.5, 90.0)
                .align(Align::Center),
        )
        .output_name("out.png")
        .output_size(320, 200);
    assert_eq!(built, CompositionConfig::from_json_str(FULL).unwrap());
}
