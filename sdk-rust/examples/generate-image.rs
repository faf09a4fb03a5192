use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use dotenvy::dotenv;
use std::fs;
use vertex_sdk::{
    google::{
        build_generate_content_parameters, GenerationKind, ImageConfig, ImageOutputOptions,
        NodeOverrides, Prompt, VertexClient,
    },
    image_utils,
};

mod common;

#[tokio::main]
async fn main() {
    dotenv().ok();
    common::init_tracing();

    let model = "gemini-3-pro-image-preview";
    let params = build_generate_content_parameters(
        &Prompt::new("Generate an image of a sunset over the ocean"),
        None,
        &NodeOverrides::image_generation(ImageConfig {
            aspect_ratio: "16:9".to_string(),
            image_size: "1K".to_string(),
            person_generation: "ALLOW_ADULT".to_string(),
            image_output_options: ImageOutputOptions {
                mime_type: "image/png".to_string(),
            },
        }),
    )
    .expect("failed to build request");

    let response = VertexClient::default()
        .generate_content(&common::vertex_config(), model, GenerationKind::Image, &params)
        .await
        .expect("generate_content failed");

    println!("{}", response.text());

    let images = response.images().expect("failed to decode images");
    for (index, image) in images.iter().enumerate() {
        let (data, mime_type) = image_utils::encode_image(image).expect("failed to encode");
        let ext = mime_type.split('/').nth(1).unwrap_or("png");
        let file_name = format!("sunset_{index}.{ext}");
        let bytes = BASE64_STANDARD.decode(data).expect("invalid base64 image data");
        fs::write(&file_name, bytes).expect("failed to write image file");
        println!("Saved {:?} image to {file_name}", image.shape());
    }
}
