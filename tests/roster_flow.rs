//! Admin roster workflow through the store runtime, over the user resource.

#![allow(clippy::unwrap_used)]

use ingressou::roster::{RosterAction, RosterEnvironment, RosterMessages, RosterReducer, RosterState};
use ingressou::store::Store;
use ingressou::testing::MockCrudGateway;
use ingressou::types::{Role, UserDraft, UserRecord};
use std::sync::Arc;
use std::time::Duration;

type UserStore = Store<
    RosterState<UserRecord>,
    RosterAction<UserRecord>,
    RosterEnvironment<UserRecord>,
    RosterReducer<UserRecord>,
>;

fn user(id: &str, first_name: &str) -> UserRecord {
    UserRecord {
        id: id.to_owned(),
        cpf: format!("000000000{id}"),
        first_name: first_name.to_owned(),
        last_name: "Silva".to_owned(),
        email: None,
        birth_date: None,
        tipo: Role::Comum,
        first_access: false,
    }
}

fn draft(first_name: &str) -> UserDraft {
    UserDraft {
        cpf: "11122233344".to_owned(),
        first_name: first_name.to_owned(),
        last_name: "Silva".to_owned(),
        email: None,
        birth_date: None,
        tipo: Role::Comum,
        first_access: true,
    }
}

fn store_with(gateway: Arc<MockCrudGateway<UserRecord>>) -> UserStore {
    Store::new(
        RosterState::default(),
        RosterReducer::default(),
        RosterEnvironment {
            gateway,
            token: "tok".to_owned(),
            messages: RosterMessages::users(),
        },
    )
}

async fn load(store: &UserStore) {
    store
        .send_and_wait_for(
            RosterAction::Load,
            |action| matches!(action, RosterAction::Loaded(_) | RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn load_pages_the_collection_three_per_page() {
    let gateway = Arc::new(
        MockCrudGateway::default()
            .with_collection((1..=7).map(|i| user(&i.to_string(), "Ana")).collect()),
    );
    let store = store_with(gateway);
    load(&store).await;

    store
        .state(|state| {
            assert_eq!(state.paged.items.len(), 7);
            assert_eq!(state.paged.page_count(), 3);
            assert_eq!(state.paged.current_view().len(), 3);
        })
        .await;

    store.send(RosterAction::NextPage).await;
    store.send(RosterAction::NextPage).await;
    store
        .state(|state| {
            assert_eq!(state.paged.current_page, 2);
            assert_eq!(state.paged.current_view().len(), 1);
        })
        .await;
}

#[tokio::test]
async fn create_appends_the_stored_record() {
    let gateway =
        Arc::new(MockCrudGateway::default().with_create_ok(user("10", "Bia")));
    let store = store_with(gateway);
    load(&store).await;

    let outcome = store
        .send_and_wait_for(
            RosterAction::Create(draft("Bia")),
            |action| matches!(action, RosterAction::Created(_) | RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, RosterAction::Created(_)));

    store
        .state(|state| {
            assert_eq!(state.paged.items.len(), 1);
            assert_eq!(state.paged.items[0].first_name, "Bia");
            assert!(state.error.is_none());
        })
        .await;
}

#[tokio::test]
async fn rejected_create_sets_error_and_keeps_collection() {
    // Empty create queue: the mock rejects with a 500.
    let gateway = Arc::new(
        MockCrudGateway::default().with_collection(vec![user("1", "Ana")]),
    );
    let store = store_with(gateway);
    load(&store).await;

    let outcome = store
        .send_and_wait_for(
            RosterAction::Create(draft("Bia")),
            |action| matches!(action, RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, RosterAction::Failed(_)));

    store
        .state(|state| {
            assert_eq!(state.paged.items.len(), 1);
            assert_eq!(
                state.error.as_deref(),
                Some("Ocorreu um problema ao tentar criar um usuário, tente novamente")
            );
        })
        .await;
}

#[tokio::test]
async fn update_replaces_the_row_in_place() {
    let gateway = Arc::new(
        MockCrudGateway::default()
            .with_collection(vec![user("1", "Ana"), user("2", "Bia"), user("3", "Cris")])
            .with_update_ok(user("2", "Beatriz")),
    );
    let store = store_with(gateway);
    load(&store).await;

    store
        .send_and_wait_for(
            RosterAction::Update {
                id: "2".to_owned(),
                draft: draft("Beatriz"),
            },
            |action| matches!(action, RosterAction::Updated(_) | RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    store
        .state(|state| {
            let names: Vec<&str> = state
                .paged
                .items
                .iter()
                .map(|u| u.first_name.as_str())
                .collect();
            assert_eq!(names, vec!["Ana", "Beatriz", "Cris"]);
        })
        .await;
}

#[tokio::test]
async fn deleting_the_last_page_sole_row_steps_the_page_back() {
    let gateway = Arc::new(
        MockCrudGateway::default()
            .with_collection((1..=7).map(|i| user(&i.to_string(), "Ana")).collect()),
    );
    let store = store_with(gateway);
    load(&store).await;

    store.send(RosterAction::NextPage).await;
    store.send(RosterAction::NextPage).await;

    store
        .send_and_wait_for(
            RosterAction::Delete("7".to_owned()),
            |action| matches!(action, RosterAction::Deleted(_) | RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    store
        .state(|state| {
            assert_eq!(state.paged.items.len(), 6);
            assert_eq!(state.paged.current_page, 1);
        })
        .await;
}

#[tokio::test]
async fn rejected_delete_reports_error_and_keeps_the_row() {
    let gateway = Arc::new(
        MockCrudGateway::default()
            .with_collection(vec![user("1", "Ana")])
            .with_delete_status(500),
    );
    let store = store_with(gateway);
    load(&store).await;

    let outcome = store
        .send_and_wait_for(
            RosterAction::Delete("1".to_owned()),
            |action| matches!(action, RosterAction::Deleted(_) | RosterAction::Failed(_)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(matches!(outcome, RosterAction::Failed(_)));

    store
        .state(|state| {
            assert_eq!(state.paged.items.len(), 1);
            assert_eq!(state.error.as_deref(), Some("Erro ao deletar usuário"));
        })
        .await;
}
