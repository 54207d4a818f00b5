use solana_sdk::message::VersionedMessage;

use crate::cluster::Cluster;

/// Generate inspector url or encoded transaction message for the given message.
pub fn inspect_transaction(
    message: &VersionedMessage,
    cluster: Option<&Cluster>,
    raw: bool,
) -> String {
    use base64::{prelude::BASE64_STANDARD, Engine};
    use url::form_urlencoded;

    let message = BASE64_STANDARD.encode(message.serialize());

    if raw {
        return message;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("message", &message);
    super::explorer::append_cluster_query(&mut serializer, cluster.unwrap_or(&Cluster::Mainnet));

    format!(
        "https://explorer.solana.com/tx/inspector?{}",
        serializer.finish()
    )
}
