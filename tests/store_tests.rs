//! Persistence behavior of the file-backed agent store.

use agentwatch::{Agent, AgentStatus, AgentStore, StoreError};
use tempfile::TempDir;

fn sample_agent() -> Agent {
    let mut agent = Agent::new(
        "AIXBT".to_string(),
        "Autonomous crypto analyst.".to_string(),
        "rank #3".to_string(),
        "$0.42".to_string(),
    );
    agent.parse_success = true;
    agent
}

#[tokio::test]
async fn save_then_get_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let saved = store.save(sample_agent()).await.unwrap();
    assert_eq!(saved.update_count, 1);

    let loaded = store.get(&saved.id).await.unwrap();
    assert_eq!(loaded, saved);
    assert!(dir.path().join("agents").join(format!("{}.json", saved.id)).exists());
}

#[tokio::test]
async fn identical_resave_does_not_bump_update_count() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let first = store.save(sample_agent()).await.unwrap();

    // Same content, fresh timestamps - must be a no-op.
    let second = store.save(sample_agent()).await.unwrap();
    assert_eq!(second.update_count, first.update_count);

    let loaded = store.get(&first.id).await.unwrap();
    assert_eq!(loaded.update_count, 1);
    assert_eq!(loaded.last_checked, first.last_checked);
}

#[tokio::test]
async fn changed_content_bumps_update_count_by_one() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let first = store.save(sample_agent()).await.unwrap();

    // Description is not part of the content ID, so this hits the same record.
    let mut changed = sample_agent();
    changed.description = "Autonomous crypto analyst, now with alpha.".to_string();
    let second = store.save(changed).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.update_count, 2);
    assert_eq!(store.get(&first.id).await.unwrap().update_count, 2);
}

#[tokio::test]
async fn empty_id_is_derived_on_save() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let mut agent = sample_agent();
    agent.id = String::new();
    let saved = store.save(agent).await.unwrap();
    assert_eq!(saved.id, agentwatch::agent_id("AIXBT", "$0.42"));
}

#[tokio::test]
async fn get_missing_agent_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    match store.get("deadbeef00000000").await {
        Err(StoreError::NotFound(id)) => assert_eq!(id, "deadbeef00000000"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn index_rebuild_preserves_input_order() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let mut agents = Vec::new();
    for name in ["Zeta", "Alpha", "Mu"] {
        let mut agent = sample_agent();
        agent.name = name.to_string();
        agent.regenerate_id();
        agents.push(store.save(agent).await.unwrap());
    }

    store.rebuild_index(&agents).await.unwrap();
    let index = store.get_index().await.unwrap();

    assert_eq!(index.agents.len(), 3);
    for (summary, agent) in index.agents.iter().zip(&agents) {
        assert_eq!(summary.id, agent.id);
        assert_eq!(summary.name, agent.name);
        assert_eq!(summary.price, agent.price);
    }
}

#[tokio::test]
async fn index_before_first_rebuild_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());
    assert!(matches!(
        store.get_index().await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn rebuild_replaces_index_wholesale() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let a = store.save(sample_agent()).await.unwrap();
    let mut other = sample_agent();
    other.name = "Luna".to_string();
    other.regenerate_id();
    let b = store.save(other).await.unwrap();

    store.rebuild_index(std::slice::from_ref(&a)).await.unwrap();
    store.rebuild_index(std::slice::from_ref(&b)).await.unwrap();

    let index = store.get_index().await.unwrap();
    assert_eq!(index.agents.len(), 1);
    assert_eq!(index.agents[0].name, "Luna");
}

#[tokio::test]
async fn status_is_derived_at_save_time() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let dead = Agent::new("Ghost".into(), String::new(), String::new(), String::new());
    let saved = store.save(dead).await.unwrap();
    assert_eq!(saved.status, AgentStatus::Dead);

    let latent = Agent::new(
        "Relic".into(),
        "This project is Discontinued.".into(),
        String::new(),
        "$0.01".into(),
    );
    let saved = store.save(latent).await.unwrap();
    assert_eq!(saved.status, AgentStatus::Latent);

    let active = store.save(sample_agent()).await.unwrap();
    assert_eq!(active.status, AgentStatus::Active);
}

#[tokio::test]
async fn find_by_name_prefers_exact_match() {
    let dir = TempDir::new().unwrap();
    let store = AgentStore::new(dir.path());

    let mut agents = Vec::new();
    for name in ["Luna Prime", "Luna"] {
        let mut agent = sample_agent();
        agent.name = name.to_string();
        agent.regenerate_id();
        agents.push(store.save(agent).await.unwrap());
    }
    store.rebuild_index(&agents).await.unwrap();

    let found = store.find_by_name("luna").await.unwrap();
    assert_eq!(found.name, "Luna");

    let found = store.find_by_name("prime").await.unwrap();
    assert_eq!(found.name, "Luna Prime");

    assert!(matches!(
        store.find_by_name("nope").await,
        Err(StoreError::NotFound(_))
    ));
}
