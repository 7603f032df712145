//! Selector fallback and label-mapping behavior of the extractor.

use agentwatch::{ExtractionError, Extractor, RenderedPage, VirtualsExtractor};

fn page(html: &str) -> RenderedPage {
    RenderedPage {
        url: "https://app.virtuals.io/virtuals/7".to_string(),
        endpoint: "/virtuals/7".to_string(),
        title: "Virtuals".to_string(),
        html: html.to_string(),
    }
}

const FULL_PROFILE: &str = r#"
<html><body>
  <div class="profile-header"><h1 class="agent-name">AIXBT</h1></div>
  <div class="agent-price">$0.42</div>
  <div class="agent-description">Autonomous crypto analyst.</div>
  <div class="agent-stats">rank #3</div>
  <section class="influence-metrics">
    <div class="metric-item"><span class="metric-label">Mindshare</span><span class="metric-value">2.4%</span></div>
    <div class="metric-item"><span class="metric-label">Followers</span><span class="metric-value">412k</span></div>
    <div class="metric-item"><span class="metric-label">Quantum Aura</span><span class="metric-value">9</span></div>
  </section>
  <div class="token-data">
    <div class="token-item"><span class="token-label">MC/FDV</span><span class="token-value">$120M</span></div>
    <div class="token-item"><span class="token-label">24h Vol</span><span class="token-value">$3.1M</span></div>
  </div>
</body></html>
"#;

#[test]
fn extracts_all_fields_from_primary_selectors() {
    let extractor = VirtualsExtractor::new();
    let agent = extractor.extract(&page(FULL_PROFILE), 7).unwrap();

    assert_eq!(agent.name, "AIXBT");
    assert_eq!(agent.price, "$0.42");
    assert_eq!(agent.description, "Autonomous crypto analyst.");
    assert_eq!(agent.stats, "rank #3");
    assert!(agent.parse_success);
    assert!(!agent.id.is_empty());

    assert_eq!(agent.influence_metrics.mindshare, "2.4%");
    assert_eq!(agent.influence_metrics.followers, "412k");
    // Unmapped label is ignored, everything else stays empty
    assert_eq!(agent.influence_metrics.engagement, "");

    assert_eq!(agent.token_data.mc_fdv, "$120M");
    assert_eq!(agent.token_data.volume_24h, "$3.1M");
    assert_eq!(agent.token_data.tvl, "");
}

#[test]
fn falls_back_to_secondary_selectors() {
    let html = r#"
    <html><body>
      <h1>Luna</h1>
      <span data-role="token-price">$1.10</span>
      <p class="profile-bio">Virtual idol.</p>
    </body></html>
    "#;
    let extractor = VirtualsExtractor::new();
    let agent = extractor.extract(&page(html), 3).unwrap();

    assert_eq!(agent.name, "Luna");
    assert_eq!(agent.price, "$1.10");
    assert_eq!(agent.description, "Virtual idol.");
    assert_eq!(agent.stats, "");
}

#[test]
fn earlier_selector_wins_over_later() {
    let html = r#"
    <html><body>
      <h1>Wrong Generic Heading</h1>
      <div class="agent-name">Correct Name</div>
    </body></html>
    "#;
    let extractor = VirtualsExtractor::new();
    let agent = extractor.extract(&page(html), 1).unwrap();
    assert_eq!(agent.name, "Correct Name");
}

#[test]
fn empty_text_candidates_are_skipped() {
    let html = r#"
    <html><body>
      <div class="agent-name">   </div>
      <h1>Fallback Name</h1>
    </body></html>
    "#;
    let extractor = VirtualsExtractor::new();
    let agent = extractor.extract(&page(html), 1).unwrap();
    assert_eq!(agent.name, "Fallback Name");
}

#[test]
fn missing_name_fails_even_with_other_fields() {
    let html = r#"
    <html><body>
      <div class="agent-price">$9.99</div>
      <div class="agent-description">A profile with no visible name.</div>
    </body></html>
    "#;
    let extractor = VirtualsExtractor::new();
    match extractor.extract(&page(html), 42) {
        Err(ExtractionError::MissingName { scan_id }) => assert_eq!(scan_id, 42),
        other => panic!("expected MissingName, got {other:?}"),
    }
}

#[test]
fn compound_ticker_name_is_split() {
    let html = r#"
    <html><body>
      <h1 class="agent-name">$LUNA 0.89</h1>
    </body></html>
    "#;
    let extractor = VirtualsExtractor::new();
    let agent = extractor.extract(&page(html), 5).unwrap();
    assert_eq!(agent.name, "$LUNA");
    assert_eq!(agent.price, "0.89");
}

#[test]
fn id_is_stable_across_refetches_of_unchanged_page() {
    let extractor = VirtualsExtractor::new();
    let first = extractor.extract(&page(FULL_PROFILE), 7).unwrap();
    let second = extractor.extract(&page(FULL_PROFILE), 7).unwrap();
    assert_eq!(first.id, second.id);
}
