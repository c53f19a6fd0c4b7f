//! Chat completion with a tool, routed through the config list in OAI_CONFIG_LIST

use async_trait::async_trait;
use llm_client::{
    config_list_from_json, ChatModel, ChatRequest, ErasedTool, LlmConfig, LlmRouter, Message,
    Tool,
};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Deserialize, JsonSchema)]
struct LookupArgs {
    /// Risk category, e.g. "Operational"
    category: String,
}

struct RiskAppetiteLookup;

#[async_trait]
impl Tool for RiskAppetiteLookup {
    const NAME: &'static str = "lookup_risk_appetite";
    type Args = LookupArgs;
    type Output = String;
    type Error = std::convert::Infallible;

    fn description(&self) -> &str {
        "Look up the organization's risk appetite for a category"
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        Ok(format!("{}: Medium", args.category))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let entries = config_list_from_json("OAI_CONFIG_LIST", &["gpt-4o", "gpt-4"])?;
    let router = LlmRouter::new(LlmConfig::new(entries));

    let mut messages = vec![
        Message::system("You are a risk analyst. Use tools when they help."),
        Message::user("What is our appetite for operational risk?"),
    ];

    println!("=== Tool Call ===");
    let response = router
        .complete(
            ChatRequest::new()
                .messages(messages.clone())
                .tools(vec![Tool::definition(&RiskAppetiteLookup)]),
        )
        .await?;

    let calls = response.message.tool_calls.clone();
    messages.push(response.message);

    for call in &calls {
        println!("{}({})", call.name(), call.arguments());
        let output = RiskAppetiteLookup.call_erased(call.arguments()).await?;
        messages.push(Message::tool(call.id.clone(), output));
    }

    println!("\n=== Answer ===");
    let answer = router.complete(ChatRequest::new().messages(messages)).await?;
    println!("{}", answer.content());

    Ok(())
}
