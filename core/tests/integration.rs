//! Full lifecycle test against the live todo server.
//!
//! Starts the server on a random port over an in-memory SQLite database,
//! then exercises every client operation over real HTTP using ureq.

use std::sync::Arc;

use todo_core::{AddUpdate, ApiError, CreateTodo, HttpMethod, HttpResponse, TodoClient, UpdateTodo};
use todo_server::{SqliteStorage, TodoStorage};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: todo_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn start_server() -> TodoClient {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let storage = SqliteStorage::in_memory().await.unwrap();
            storage.initialize().await.unwrap();
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, Arc::new(storage)).await
        })
        .unwrap();
    });

    TodoClient::new(&format!("http://{addr}"))
}

#[test]
fn todo_lifecycle() {
    let client = start_server();

    // List: should be empty.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Create without a title is rejected.
    let req = client
        .build_create_todo(&CreateTodo {
            title: String::new(),
            description: None,
        })
        .unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::BadRequest { ref message } if message == "Title is required"));

    // Create.
    let req = client
        .build_create_todo(&CreateTodo {
            title: "Integration test".to_string(),
            description: Some("over real HTTP".to_string()),
        })
        .unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.title, "Integration test");
    assert_eq!(created.description, "over real HTTP");
    assert!(!created.completed);
    assert!(created.completed_at.is_none());
    let id = created.id;

    // Get: same record, no notes yet.
    let fetched = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    assert_eq!(fetched.todo, created);
    assert!(fetched.updates.is_empty());

    // Update title; description omitted becomes empty.
    let req = client
        .build_update_todo(
            id,
            &UpdateTodo {
                title: "Updated title".to_string(),
                description: None,
            },
        )
        .unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert_eq!(updated.description, "");

    // Add two notes: newest first.
    for text in ["first note", "second note"] {
        let req = client
            .build_add_update(id, &AddUpdate { update: text.to_string() })
            .unwrap();
        client.parse_add_update(execute(req)).unwrap();
    }
    let detail = client.parse_get_todo(execute(client.build_get_todo(id))).unwrap();
    let texts: Vec<&str> = detail.updates.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["second note", "first note"]);

    // Complete.
    let completed = client
        .parse_complete_todo(execute(client.build_complete_todo(id)))
        .unwrap();
    assert!(completed.todo.completed);
    assert!(completed.todo.completed_at.is_some());
    assert_eq!(completed.updates.len(), 2);

    // Completed todos are locked.
    let err = client
        .parse_complete_todo(execute(client.build_complete_todo(id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    let req = client
        .build_update_todo(
            id,
            &UpdateTodo {
                title: "too late".to_string(),
                description: None,
            },
        )
        .unwrap();
    assert!(matches!(
        client.parse_update_todo(execute(req)).unwrap_err(),
        ApiError::NotFound { .. }
    ));

    let req = client
        .build_add_update(id, &AddUpdate { update: "too late".to_string() })
        .unwrap();
    let err = client.parse_add_update(execute(req)).unwrap_err();
    assert!(matches!(
        err,
        ApiError::BadRequest { ref message } if message == "Cannot add updates to completed todos"
    ));

    let err = client
        .parse_delete_todo(execute(client.build_delete_todo(id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // A second, active todo can be deleted.
    let req = client
        .build_create_todo(&CreateTodo {
            title: "Disposable".to_string(),
            description: None,
        })
        .unwrap();
    let disposable = client.parse_create_todo(execute(req)).unwrap();

    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].id, disposable.id);

    let message = client
        .parse_delete_todo(execute(client.build_delete_todo(disposable.id)))
        .unwrap();
    assert_eq!(message, "Todo deleted successfully");

    let err = client
        .parse_get_todo(execute(client.build_get_todo(disposable.id)))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // Only the completed todo remains.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
}
