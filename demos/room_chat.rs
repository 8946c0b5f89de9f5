//! Room chat walkthrough with simulated frontend nodes
//!
//! Run with: cargo run --example room_chat
//!
//! Three frontend nodes are simulated in-process. The transport prints what
//! each node would write to its sockets; `fe-3` is marked down to show how a
//! failing node is reported without blocking delivery to the others.
//!
//! Set `RUST_LOG=channel_rs=debug` for the dispatch log.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use channel_rs::cluster::{LocalSessions, StaticDirectory};
use channel_rs::{
    ChannelError, ChannelService, Message, NodeId, PushOptions, PushRequest, Recipients,
    Transport, TransportError,
};

/// Prints pushes instead of sending them over the wire
struct PrintingTransport {
    down: HashSet<NodeId>,
}

#[async_trait]
impl Transport for PrintingTransport {
    async fn push_to_node(
        &self,
        node: &NodeId,
        recipients: Recipients,
        request: &PushRequest,
    ) -> Result<(), TransportError> {
        if self.down.contains(node) {
            return Err(TransportError::Unreachable(format!("{} is down", node)));
        }

        let route = request.route.as_deref().unwrap_or("<default>");
        let body = String::from_utf8_lossy(&request.body);
        match recipients {
            Recipients::Actors(actors) => {
                println!("[{}] {} -> actors {:?}: {}", node, route, actors, body)
            }
            Recipients::AllSessions => println!(
                "[{}] {} -> all {}sessions: {}",
                node,
                route,
                if request.opts.binded { "bound " } else { "" },
                body
            ),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("channel_rs=info".parse()?)
                .add_directive("room_chat=debug".parse()?),
        )
        .init();

    let sessions = Arc::new(LocalSessions::new());
    let directory =
        Arc::new(StaticDirectory::new().with_nodes("connector", ["fe-1", "fe-2", "fe-3"]));
    let transport = Arc::new(PrintingTransport {
        down: [NodeId::from("fe-3")].into_iter().collect(),
    });
    let service = ChannelService::new(sessions.clone(), transport, directory);

    // Clients connect to frontends
    for (actor, node) in [(101, "fe-1"), (102, "fe-2"), (103, "fe-1"), (104, "fe-3")] {
        sessions.connect(actor, node);
    }

    let room = service.create_channel("room1")?;
    for actor in [101, 102, 103] {
        room.add(actor).await?;
    }

    println!("== room broadcast");
    room.broadcast(
        Message::routed("onChat", Bytes::from_static(br#"{"text":"hi"}"#)),
        PushOptions::default(),
    )
    .await?;

    println!("== private push");
    room.push_message(102, "onWhisper", &b"psst"[..], PushOptions::default())
        .await?;

    println!("== actor 104 joins on a node that is down");
    room.add(104).await?;
    match room
        .broadcast(Message::routed("onChat", &b"welcome"[..]), PushOptions::default())
        .await
    {
        Err(ChannelError::NodeUnreachable(report)) => println!(
            "delivered to {} nodes, failed on {:?}",
            report.delivered.len(),
            report.failed_nodes().collect::<Vec<_>>()
        ),
        other => println!("unexpected outcome: {:?}", other),
    }

    println!("== server-wide notice to bound sessions");
    if let Err(e) = service
        .broadcast(
            "connector",
            "onNotice",
            &b"restart in 5 minutes"[..],
            PushOptions::default().binded(),
        )
        .await
    {
        println!("notice partially failed: {}", e);
    }

    room.destroy();
    println!(
        "room1 destroyed, still registered: {}",
        service.get_channel("room1", false).is_some()
    );

    Ok(())
}
