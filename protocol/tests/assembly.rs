//! End-to-end tests for transaction assembly.
//!
//! Online scenarios run against a mock node: a Unix socket under a temporary
//! data directory that answers the three IPC queries from the embedded
//! schema set and a fixed account record. Offline scenarios use no node at
//! all. Both must produce the ledger's exact bytes.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value as Json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

use txcraft_protocol::assembler::{
    CreateError, CreateOptions, OutputFormat, Sources, TransactionAssembler,
};
use txcraft_protocol::config::IPC_SOCKET_PATH;
use txcraft_protocol::network::{RpcError, RpcRequest, RpcResponse};
use txcraft_protocol::prompt::{QuestionKind, ScriptedPrompter};
use txcraft_protocol::schema::builtin_schema_set;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const PASSPHRASE: &str = "peanut hundred pen hawk invite exclude brain chunk gadget wait wrong ready";
const NETWORK: &str = "873da85a2cee70da631d90b0f17fada8c3ac9b83b2613f4ca5fddd374d1034b3";
const SENDER: &str = "0fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a";
const RECIPIENT: &str = "ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815";

/// Account record with nonce 0 and a balance of 100000000.
const ACCOUNT: &str = "0a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581512050880c2d72f1a020800220208002a3b0a1a0a0a67656e657369735f3834180020850528003080a094a58d1d121d0a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151080a094a58d1d";

const TRANSFER_ASSET: &str = r#"{"amount":100,"recipientAddress":"ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815","data":"send token"}"#;
const VOTE_ASSET: &str = r#"{"votes":[{"delegateAddress":"ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815","amount":100},{"delegateAddress":"ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815","amount":-50}]}"#;
const UNVOTE_ASSET: &str = r#"{"votes":[{"delegateAddress":"ab0041a7d3f7b2c290b5b834d46bdc7b7eb85815","amount":-50}]}"#;

const OFFLINE_TRANSFER: &str = "0802100018012080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a322408641214ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151a0a73656e6420746f6b656e3a40816039d55d0710f6b412e221b4fc0422a29d5314603c43eeafab0017e4c6bfbd575c5d53b2c0429992922737ec0f8add0767b904b80cfc411021bfdb0b04bc0a";
const OFFLINE_VOTE: &str = "0805100118012080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a32350a190a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510c8010a180a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510633a40cf630a8bd820a4176bde1c9af65c316d020c3db012729d46d1fa5784e0f9b7eaa730dcc7ad603620c302f0855116398e8c9ba7a2a6ed54061e67fbf1f7c5100c";
const OFFLINE_UNVOTE: &str = "0805100118012080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a321a0a180a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510633a4009da2349735f2bd71d2e013f261c1ff4a75091daed56521de4b55156a5c8802446574328c76a3168c5f912cdf59275f070c1a1904fec6e8ef3a021019a96820b";

const ONLINE_TRANSFER_UNSIGNED: &str = "0802100018002080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a322408641214ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151a0a73656e6420746f6b656e";
const ONLINE_TRANSFER: &str = "0802100018002080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a322408641214ab0041a7d3f7b2c290b5b834d46bdc7b7eb858151a0a73656e6420746f6b656e3a403cc8c8c81097fe59d9df356b3c3f1dd10f619bfabb54f5d187866092c67e0102c64dbe24f357df493cc7ebacdd2e55995db8912245b718d88ebf7f4f4ac01f04";
const ONLINE_VOTE: &str = "0805100118002080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a32350a190a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510c8010a180a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510633a40d8d475f98d02508e410c735934f6db047bf99e22094f13fe24281b066d4fc725885f696e4e929320700117e01b1baa7251dd8639d194032c9ad9af93d5d6c50f";
const ONLINE_UNVOTE: &str = "0805100118002080c2d72f2a200fe9a3f1a21b5530f27f87a414b549e79a940bf24fdf2b2f05e7f22aeeecc86a321a0a180a14ab0041a7d3f7b2c290b5b834d46bdc7b7eb8581510633a40cb9d17b605f2711accaba4759a4e99c4b1ece97da0220603af9e8fd9aa88e01cd45dbca9aaad7fee61f6ef622149057b0189a4ab9ab5a9bc3e1a2bdad302d104";

fn options(module_id: u32, asset_id: u32) -> CreateOptions {
    CreateOptions {
        module_id,
        asset_id,
        fee: 100_000_000,
        ..Default::default()
    }
}

fn offline(module_id: u32, asset_id: u32, asset: &str) -> CreateOptions {
    CreateOptions {
        offline: true,
        network_identifier: Some(NETWORK.into()),
        nonce: Some(1),
        asset: Some(asset.into()),
        passphrase: Some(PASSPHRASE.into()),
        ..options(module_id, asset_id)
    }
}

// ---------------------------------------------------------------------------
// Mock node
// ---------------------------------------------------------------------------

/// A node answering on `<data_path>/tmp/sockets/ipc.sock`. Records the
/// method of every request it serves.
struct MockNode {
    dir: tempfile::TempDir,
    calls: Arc<Mutex<Vec<String>>>,
    server: JoinHandle<()>,
}

impl MockNode {
    fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join(IPC_SOCKET_PATH);
        std::fs::create_dir_all(socket.parent().unwrap()).unwrap();
        let listener = UnixListener::bind(&socket).unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&calls);
        let server = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let (reader, mut writer) = stream.into_split();
                let mut line = String::new();
                if BufReader::new(reader).read_line(&mut line).await.is_err() {
                    continue;
                }
                let request: RpcRequest = serde_json::from_str(&line).unwrap();
                log.lock().unwrap().push(request.method.clone());
                let mut reply = serde_json::to_vec(&respond(request)).unwrap();
                reply.push(b'\n');
                let _ = writer.write_all(&reply).await;
            }
        });

        Self { dir, calls, server }
    }

    fn data_path(&self) -> &Path {
        self.dir.path()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn online(&self, module_id: u32, asset_id: u32) -> CreateOptions {
        CreateOptions {
            data_path: Some(self.data_path().to_path_buf()),
            ..options(module_id, asset_id)
        }
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn respond(request: RpcRequest) -> RpcResponse {
    match request.method.as_str() {
        "app:getSchema" => RpcResponse::success(request.id, builtin_schema_set().to_json()),
        "app:getNodeInfo" => RpcResponse::success(
            request.id,
            json!({ "networkIdentifier": NETWORK, "height": 120 }),
        ),
        "app:getAccount" => RpcResponse::success(request.id, json!(ACCOUNT)),
        other => RpcResponse::error(request.id, RpcError::method_not_found(other)),
    }
}

async fn create_hex(opts: &CreateOptions, prompter: &mut ScriptedPrompter) -> Result<String, CreateError> {
    let assembled = TransactionAssembler::create(opts, prompter).await?;
    Ok(assembled.render(OutputFormat::Hex)?["transaction"]
        .as_str()
        .unwrap()
        .to_string())
}

fn transfer_prompts() -> ScriptedPrompter {
    ScriptedPrompter::new()
        .with_input("100")
        .with_input(RECIPIENT)
        .with_input("send token")
}

// ---------------------------------------------------------------------------
// Online
// ---------------------------------------------------------------------------

#[tokio::test]
async fn online_transfer_from_asset_flag() {
    let node = MockNode::start();
    let opts = CreateOptions {
        asset: Some(TRANSFER_ASSET.into()),
        passphrase: Some(PASSPHRASE.into()),
        ..node.online(2, 0)
    };
    let hex = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    assert_eq!(hex, ONLINE_TRANSFER);
    assert_eq!(
        node.calls(),
        vec!["app:getSchema", "app:getAccount", "app:getNodeInfo"]
    );
}

#[tokio::test]
async fn online_transfer_from_prompts() {
    let node = MockNode::start();
    let mut prompter = transfer_prompts().with_passphrase(PASSPHRASE);
    let hex = create_hex(&node.online(2, 0), &mut prompter).await.unwrap();
    assert_eq!(hex, ONLINE_TRANSFER);

    let messages: Vec<&str> = prompter.asked().iter().map(|q| q.message.as_str()).collect();
    assert_eq!(
        &messages[..3],
        &[
            "Please enter: amount: ",
            "Please enter: recipientAddress: ",
            "Please enter: data: ",
        ]
    );
    assert_eq!(prompter.asked()[3].name, "passphrase");
}

#[tokio::test]
async fn online_unsigned_transfer_skips_network_identifier() {
    let node = MockNode::start();
    let opts = CreateOptions {
        asset: Some(TRANSFER_ASSET.into()),
        no_signature: true,
        sender_public_key: Some(SENDER.into()),
        ..node.online(2, 0)
    };
    let hex = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    assert_eq!(hex, ONLINE_TRANSFER_UNSIGNED);
    assert!(!node.calls().iter().any(|m| m == "app:getNodeInfo"));
}

#[tokio::test]
async fn online_vote_from_prompts() {
    let node = MockNode::start();
    let vote = format!("{RECIPIENT},100");
    let unvote = format!("{RECIPIENT},-50");
    let mut prompter = ScriptedPrompter::new()
        .with_input(vote)
        .with_confirm(true)
        .with_input(unvote)
        .with_confirm(false)
        .with_passphrase(PASSPHRASE);
    let hex = create_hex(&node.online(5, 1), &mut prompter).await.unwrap();
    assert_eq!(hex, ONLINE_VOTE);

    let kinds: Vec<QuestionKind> = prompter.asked().iter().map(|q| q.kind).collect();
    assert_eq!(
        kinds,
        vec![
            QuestionKind::Input,
            QuestionKind::Confirm,
            QuestionKind::Input,
            QuestionKind::Confirm,
            QuestionKind::Input,
        ]
    );
    assert_eq!(
        prompter.asked()[0].message,
        "Please enter: votes(delegateAddress, amount): "
    );
}

#[tokio::test]
async fn online_unvote_from_asset_flag() {
    let node = MockNode::start();
    let opts = CreateOptions {
        asset: Some(UNVOTE_ASSET.into()),
        passphrase: Some(PASSPHRASE.into()),
        ..node.online(5, 1)
    };
    let hex = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    assert_eq!(hex, ONLINE_UNVOTE);
}

#[tokio::test]
async fn online_json_output() {
    let node = MockNode::start();
    let opts = CreateOptions {
        asset: Some(TRANSFER_ASSET.into()),
        passphrase: Some(PASSPHRASE.into()),
        format: OutputFormat::Json,
        ..node.online(2, 0)
    };
    let assembled = TransactionAssembler::create(&opts, &mut ScriptedPrompter::new())
        .await
        .unwrap();
    let json = assembled.render(opts.format).unwrap();
    assert_eq!(json["moduleID"], 2);
    assert_eq!(json["assetID"], 0);
    assert_eq!(json["nonce"], "0");
    assert_eq!(json["fee"], "100000000");
    assert_eq!(json["senderPublicKey"], SENDER);
    assert_eq!(
        json["asset"],
        json!({ "amount": "100", "recipientAddress": RECIPIENT, "data": "send token" })
    );
    assert_eq!(json["signatures"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn explicit_nonce_and_network_skip_node_queries() {
    let node = MockNode::start();
    let opts = CreateOptions {
        asset: Some(TRANSFER_ASSET.into()),
        passphrase: Some(PASSPHRASE.into()),
        nonce: Some(0),
        network_identifier: Some(NETWORK.into()),
        ..node.online(2, 0)
    };
    let hex = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    assert_eq!(hex, ONLINE_TRANSFER);
    assert_eq!(node.calls(), vec!["app:getSchema"]);
}

#[tokio::test]
async fn online_unknown_asset_fails_before_prompting() {
    let node = MockNode::start();
    let mut prompter = ScriptedPrompter::new();
    let err = TransactionAssembler::create(&node.online(99999, 0), &mut prompter)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Transaction moduleID:99999 with assetID:0 is not registered in the application"
    );
    assert!(prompter.asked().is_empty());
}

#[tokio::test]
async fn node_not_running_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let opts = CreateOptions {
        data_path: Some(dir.path().to_path_buf()),
        asset: Some(TRANSFER_ASSET.into()),
        ..options(2, 0)
    };
    let err = TransactionAssembler::create(&opts, &mut ScriptedPrompter::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::NodeUnreachable { .. }));
}

// ---------------------------------------------------------------------------
// Offline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn offline_vectors() {
    for (module_id, asset_id, asset, expected) in [
        (2, 0, TRANSFER_ASSET, OFFLINE_TRANSFER),
        (5, 1, VOTE_ASSET, OFFLINE_VOTE),
        (5, 1, UNVOTE_ASSET, OFFLINE_UNVOTE),
    ] {
        let opts = offline(module_id, asset_id, asset);
        let hex = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
        assert_eq!(hex, expected, "{module_id}/{asset_id}");
    }
}

#[tokio::test]
async fn offline_transfer_from_prompts_matches_flag() {
    let mut opts = offline(2, 0, TRANSFER_ASSET);
    opts.asset = None;
    let hex = create_hex(&opts, &mut transfer_prompts()).await.unwrap();
    assert_eq!(hex, OFFLINE_TRANSFER);
}

#[tokio::test]
async fn offline_and_online_agree_for_same_inputs() {
    let node = MockNode::start();
    let online = CreateOptions {
        asset: Some(VOTE_ASSET.into()),
        passphrase: Some(PASSPHRASE.into()),
        nonce: Some(1),
        ..node.online(5, 1)
    };
    let from_node = create_hex(&online, &mut ScriptedPrompter::new()).await.unwrap();
    let without_node = create_hex(&offline(5, 1, VOTE_ASSET), &mut ScriptedPrompter::new())
        .await
        .unwrap();
    assert_eq!(from_node, without_node);
    assert_eq!(from_node, OFFLINE_VOTE);
}

#[tokio::test]
async fn identical_inputs_give_identical_output() {
    let opts = offline(2, 0, TRANSFER_ASSET);
    let first = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    let second = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn offline_flag_errors_in_order() {
    let mut opts = offline(2, 0, TRANSFER_ASSET);
    opts.data_path = Some("/tmp/anything".into());
    opts.network_identifier = None;
    let err = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Flag: --data-path should not be specified while creating transaction offline"
    );

    opts.data_path = None;
    let err = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Flag: --network-identifier must be specified while creating transaction offline"
    );

    opts.network_identifier = Some(NETWORK.into());
    opts.nonce = None;
    let err = create_hex(&opts, &mut ScriptedPrompter::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Flag: --nonce must be specified while creating transaction offline"
    );
}

#[tokio::test]
async fn offline_invalid_amount_in_prompt() {
    let mut opts = offline(2, 0, TRANSFER_ASSET);
    opts.asset = None;
    let mut prompter = ScriptedPrompter::new()
        .with_input("abc")
        .with_input(RECIPIENT)
        .with_input("send token");
    let err = create_hex(&opts, &mut prompter).await.unwrap_err();
    assert!(err.to_string().contains("Cannot convert abc to an integer"));
}

#[tokio::test]
async fn decode_then_sign_reproduces_signed_vector() {
    let assembler = TransactionAssembler::new(Sources::offline());
    let unsigned = &OFFLINE_TRANSFER[..OFFLINE_TRANSFER.len() - 132];

    let decoded: Json = assembler.decode(unsigned).await.unwrap();
    assert_eq!(decoded["signatures"], json!([]));
    assert_eq!(decoded["asset"]["recipientAddress"], RECIPIENT);

    let signed = assembler
        .sign(unsigned, Some(NETWORK), Some(PASSPHRASE.into()), &mut ScriptedPrompter::new())
        .await
        .unwrap();
    assert_eq!(
        signed.render(OutputFormat::Hex).unwrap(),
        json!({ "transaction": OFFLINE_TRANSFER })
    );
}

#[tokio::test]
async fn resigning_with_same_passphrase_is_rejected() {
    let assembler = TransactionAssembler::new(Sources::offline());
    let err = assembler
        .sign(OFFLINE_TRANSFER, Some(NETWORK), Some(PASSPHRASE.into()), &mut ScriptedPrompter::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::AlreadySigned { .. }));
    assert_eq!(
        err.to_string(),
        format!("transaction already carries a signature from {SENDER}")
    );
}
