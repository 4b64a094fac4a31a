/// JSON-RPC requests driving a whole board session
use rand::rngs::StdRng;
use rand::SeedableRng;
use rutin::rpc::protocol::error_codes;
use rutin::rpc::RpcServer;
use rutin::*;
use serde_json::{json, Value};
use tempfile::tempdir;

#[cfg(test)]
mod rpc_tests {
    use super::*;

    fn server(dir: &std::path::Path) -> RpcServer {
        let storage = open_storage(StorageKind::Json, dir).expect("Failed to open storage");
        RpcServer::new(Session::with_rng(storage, StdRng::seed_from_u64(5)).expect("Failed to load session"))
    }

    async fn call(server: &mut RpcServer, method: &str, params: Value) -> Value {
        let line = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}).to_string();
        let response = server.process_line(&line).await.expect("Expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_toggle_and_read_back() {
        let dir = tempdir().unwrap();
        let mut server = server(dir.path());
        let today = dates::format_date(dates::today());

        let response = call(
            &mut server,
            "action/dispatch",
            json!({"action": {"type": "toggleCompletion", "habitId": "habit-1", "date": today}}),
        )
        .await;
        let result = &response["result"];
        assert_eq!(result["effects"], json!([{"type": "render"}, {"type": "persist"}]));

        // The seed marks today as done, so toggling clears it
        let card = &result["board"]["cards"][0];
        assert_eq!(card["days"][6]["completed"], false);
        assert!(dir.path().join("habits.json").exists());

        let text = call(&mut server, "view/get", json!({"format": "text"})).await;
        assert!(text["result"]["text"].as_str().unwrap().contains("Read a Book"));
    }

    #[tokio::test]
    async fn test_inline_import_needs_confirmation() {
        let dir = tempdir().unwrap();
        let mut server = server(dir.path());

        let staged = call(
            &mut server,
            "backup/import",
            json!({"document": {"version": "1.1", "habits": [{"name": "Swim"}]}}),
        )
        .await;
        assert_eq!(staged["result"]["board"]["dialog"]["kind"], "confirmImport");

        let confirmed = call(&mut server, "action/dispatch", json!({"action": {"type": "confirmImport"}})).await;
        assert_eq!(confirmed["result"]["notices"][0], "Successfully imported 1 habit");
        assert_eq!(confirmed["result"]["board"]["cards"][0]["name"], "Swim");
    }

    #[tokio::test]
    async fn test_export_writes_backup_file() {
        let dir = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut server = server(dir.path());

        let response = call(&mut server, "backup/export", json!({"dir": out.path()})).await;
        let result = &response["result"];
        assert_eq!(result["document"]["version"], "1.1");
        assert_eq!(result["document"]["habits"][0]["id"], "habit-1");

        let path = result["path"].as_str().unwrap();
        assert!(std::path::Path::new(path).exists());
    }

    #[tokio::test]
    async fn test_unknown_habit_maps_to_not_found() {
        let dir = tempdir().unwrap();
        let mut server = server(dir.path());

        let response = call(
            &mut server,
            "action/dispatch",
            json!({"action": {"type": "requestDelete", "habitId": "nope"}}),
        )
        .await;
        assert_eq!(response["error"]["code"], error_codes::HABIT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_methods_work_with_or_without_initialize() {
        let dir = tempdir().unwrap();
        let mut server = server(dir.path());

        let view = call(&mut server, "view/get", json!(null)).await;
        assert_eq!(view["result"]["board"]["cards"][0]["name"], "Read a Book");

        for _ in 0..2 {
            let hello = call(&mut server, "initialize", json!({})).await;
            assert_eq!(hello["result"]["serverInfo"]["name"], "rutin");
        }
    }
}
