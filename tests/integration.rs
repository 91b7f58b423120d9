// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for reading, transforming and writing OPML.

use opml::outline::{Document, Outline};
use opml::renderer::{self, RenderOptions};
use opml::tree::{CaseMode, SortKey};
use opml::urls::{self, UrlOptions};
use opml::parser;
use pretty_assertions::assert_eq;

const SUBSCRIPTIONS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<opml version="2.0">
    <head>
        <title>Subscriptions</title>
        <dateCreated>05 Dec 24 00:00 +0000</dateCreated>
        <ownerName>Example Owner</ownerName>
        <expansionState>1,3</expansionState>
        <windowTop>61</windowTop>
    </head>
    <body>
        <outline text="Places of interest">
            <outline text="Victoria, BC" type="link" url="https://www.tourismvictoria.com/"/>
            <outline text="Boston">
                <outline text="West Newton"/>
                <outline text="Cambridge"/>
            </outline>
            <outline text="Bay Area" isComment="true"/>
        </outline>
        <outline text="News" type="folder">
            <outline text="LWN" type="rss" xmlUrl="https://lwn.net/headlines/rss" htmlUrl="https://lwn.net" language="en"/>
            <outline text="Fish &amp; Chips" type="rss" xmlUrl="https://fish.example/feed?a=1&amp;b=2"/>
        </outline>
    </body>
</opml>
"#;

fn subscriptions() -> Document {
    parser::parse(SUBSCRIPTIONS.as_bytes()).expect("sample document should parse")
}

fn labels(outlines: &[Outline]) -> Vec<&str> {
    outlines.iter().map(|o| o.label.as_str()).collect()
}

#[test]
fn parses_head_and_nested_outlines() {
    let doc = subscriptions();

    assert_eq!(doc.version, "2.0");
    assert_eq!(doc.head.title, "Subscriptions");
    assert_eq!(doc.head.owner_name, "Example Owner");
    assert_eq!(doc.head.window_top, 61);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.count(), 9);

    let fish = doc.select(&[1, 1]).expect("second news feed");
    assert_eq!(fish.label, "Fish & Chips");
    assert_eq!(fish.feed_url, "https://fish.example/feed?a=1&b=2");
    assert!(doc.select(&[0, 2]).expect("Bay Area").is_comment);
    assert!(doc.select(&[5]).is_none());
}

#[test]
fn xml_round_trip_preserves_document() {
    let doc = subscriptions();

    for pretty in [false, true] {
        let opts = RenderOptions {
            pretty,
            declaration: true,
            ..RenderOptions::default()
        };
        let xml = renderer::render_xml(&doc, &opts).unwrap();
        assert_eq!(parser::parse(&xml).unwrap(), doc);
    }
}

#[test]
fn empty_document_renders_placeholder() {
    let xml = renderer::render_xml(&Document::new(), &RenderOptions::default()).unwrap();

    assert_eq!(
        String::from_utf8(xml).unwrap(),
        r#"<opml version="2.0"><head></head><body><outline text=""></outline></body></opml>"#
    );
}

#[test]
fn json_projection_omits_empty_fields() {
    let doc = parser::parse(
        br#"<opml version="2.0"><body><outline text="LWN" type="rss" xmlUrl="https://lwn.net/headlines/rss"/></body></opml>"#,
    )
    .unwrap();

    let json = renderer::render_json(&doc, false).unwrap();
    assert_eq!(
        String::from_utf8(json).unwrap(),
        r#"{"version":"2.0","body":{"outline":[{"text":"LWN","type":"rss","xmlUrl":"https://lwn.net/headlines/rss"}]}}"#
    );

    let back = parser::parse_json(&renderer::render_json(&subscriptions(), true).unwrap()).unwrap();
    assert_eq!(back, subscriptions());
}

#[test]
fn sort_then_render_orders_every_level() {
    let mut doc = subscriptions();
    doc.sort(SortKey::Label, CaseMode::Sensitive);

    let xml = renderer::render_xml(&doc, &RenderOptions::default()).unwrap();
    let sorted = parser::parse(&xml).unwrap();

    assert_eq!(labels(&sorted.body.outlines), ["News", "Places of interest"]);
    assert_eq!(labels(&sorted.body.outlines[0].children), ["Fish & Chips", "LWN"]);
    assert_eq!(
        labels(&sorted.body.outlines[1].children),
        ["Bay Area", "Boston", "Victoria, BC"]
    );
    assert_eq!(
        labels(&sorted.body.outlines[1].children[1].children),
        ["Cambridge", "West Newton"]
    );
}

#[test]
fn sort_by_kind_keeps_ties_in_place() {
    let mut doc = subscriptions();
    doc.sort(SortKey::Kind, CaseMode::Sensitive);

    assert_eq!(labels(&doc.body.outlines), ["Places of interest", "News"]);
    assert_eq!(
        labels(&doc.body.outlines[0].children),
        ["Boston", "Bay Area", "Victoria, BC"]
    );
}

#[test]
fn concatenates_documents_in_order() {
    let first = subscriptions();
    let second = parser::parse(
        br#"<opml version="1.0"><body><outline text="Podcasts"><outline text="Show"/></outline></body></opml>"#,
    )
    .unwrap();

    let mut all = Document::new();
    all.merge_from([&first, &second]).unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(&all.body.outlines[..2], &first.body.outlines[..]);
    assert_eq!(all.body.outlines[2], second.body.outlines[0]);
    assert!(all.head.is_empty());
    assert_eq!(all.version, "2.0");
}

#[test]
fn extracts_urls_and_rebuilds_document() {
    let doc = subscriptions();

    let mut out = Vec::new();
    urls::write_urls(&doc, &UrlOptions::default(), &mut out).unwrap();
    let list = String::from_utf8(out).unwrap();
    assert_eq!(
        list,
        "https://lwn.net/headlines/rss\nhttps://fish.example/feed?a=1&b=2\n"
    );

    let rebuilt = urls::read_url_list(&list).into_document("Rebuilt", "");
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt.body.outlines[1].feed_url, "https://fish.example/feed?a=1&b=2");

    let xml = renderer::render_xml(&rebuilt, &RenderOptions::default()).unwrap();
    assert_eq!(parser::parse(&xml).unwrap(), rebuilt);
}

#[test]
fn writes_newsboat_urls() {
    let opts = UrlOptions {
        newsboat: true,
        ..UrlOptions::default()
    };
    let mut out = Vec::new();
    urls::write_urls(&subscriptions(), &opts, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "https://lwn.net/headlines/rss \"~LWN\"\nhttps://fish.example/feed?a=1&b=2 \"~Fish & Chips\"\n"
    );
}

#[test]
fn reads_and_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("subscriptions.opml");
    let output = dir.path().join("copy.opml");
    std::fs::write(&input, SUBSCRIPTIONS).unwrap();

    let doc = parser::parse_file(&input).unwrap();
    renderer::write_file(&doc, &output, &RenderOptions::default()).unwrap();

    assert_eq!(parser::parse_file(&output).unwrap(), doc);
}

#[test]
fn missing_file_reports_path() {
    let err = parser::parse_file("/nonexistent/feeds.opml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/feeds.opml"));
}
