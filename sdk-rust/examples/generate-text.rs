use dotenvy::dotenv;
use vertex_sdk::google::{
    build_generate_content_parameters, GenerationKind, NodeOverrides, Prompt, VertexClient,
};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let params = build_generate_content_parameters(
        &Prompt::new("Tell me a story in 50 words"),
        None,
        &NodeOverrides::text_generation(0.7, 8192)
            .with_system_instruction("You are a helpful assistant."),
    )
    .expect("failed to build request");

    let response = VertexClient::default()
        .generate_content(
            &common::vertex_config(),
            "gemini-2.5-flash",
            GenerationKind::Text,
            &params,
        )
        .await
        .expect("generate_content failed");

    println!("{}", response.text());
    if let Some(usage) = response.usage() {
        println!("{usage:#?}");
    }
}
