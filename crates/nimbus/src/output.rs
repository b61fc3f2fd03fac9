use colored::Colorize;
use nimbus_cloud::{NodeMetadata, NodeState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn colored_state(state: NodeState) -> colored::ColoredString {
    let text = state.to_string();
    match state {
        NodeState::Running => text.green(),
        NodeState::Pending | NodeState::Stopping => text.yellow(),
        NodeState::Suspended | NodeState::Terminated => text.dimmed(),
        NodeState::Error => text.red(),
        NodeState::Unknown => text.normal(),
    }
}

pub fn nodes(nodes: &[NodeMetadata], format: Format) -> anyhow::Result<()> {
    if format == Format::Json {
        return json(nodes);
    }
    if nodes.is_empty() {
        println!("{}", "No nodes".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<12} {:<24} {:<12} {:<10} {:<16} {:<16}",
            "ID", "NAME", "STATE", "LOCATION", "PUBLIC IP", "PRIVATE IP"
        )
        .bold()
    );
    println!("{}", "─".repeat(94).dimmed());
    for node in nodes {
        println!(
            "{:<12} {:<24} {:<12} {:<10} {:<16} {:<16}",
            node.id,
            node.name,
            colored_state(node.state),
            node.location.as_deref().unwrap_or("-"),
            node.public_addresses.first().map(String::as_str).unwrap_or("-"),
            node.private_addresses.first().map(String::as_str).unwrap_or("-"),
        );
    }
    Ok(())
}

pub fn node(node: &NodeMetadata, format: Format) -> anyhow::Result<()> {
    if format == Format::Json {
        return json(node);
    }
    println!("{} {}", "Node".bold(), node.name.cyan());
    println!("  id:       {}", node.id);
    println!("  group:    {}", node.group.as_deref().unwrap_or("-"));
    println!("  state:    {}", colored_state(node.state));
    println!("  location: {}", node.location.as_deref().unwrap_or("-"));
    println!("  public:   {}", node.public_addresses.join(", "));
    println!("  private:  {}", node.private_addresses.join(", "));
    if let Some(credentials) = &node.credentials {
        println!("  login:    {}", credentials.identity);
    }
    Ok(())
}

/// Two-column listing for catalog style results
pub fn pairs<'a>(
    header: (&str, &str),
    rows: impl IntoIterator<Item = (String, &'a str)>,
) -> anyhow::Result<()> {
    println!("{}", format!("{:<20} {}", header.0, header.1).bold());
    println!("{}", "─".repeat(60).dimmed());
    for (left, right) in rows {
        println!("{:<20} {}", left, right);
    }
    Ok(())
}
