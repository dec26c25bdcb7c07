use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::TemplateBlock;
use crate::services::docx::DOCX_MIME;
use crate::services::llm::LlmClient;
use crate::services::logger::ActivityLogger;
use crate::services::{assembler, docx, prompt, segmenter, template};

#[derive(Clone)]
pub struct AppState {
    pub llm_client: Arc<LlmClient>,
    pub logger: Arc<ActivityLogger>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::AllowMethods::any())
                .allow_headers(tower_http::cors::AllowHeaders::any()),
        )
}

async fn index() -> Html<&'static str> {
    Html(
        r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Lesson Plan Generator</title>
        <meta charset="utf-8">
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; max-width: 720px; }
            .info-box { background-color: #f0f8ff; padding: 20px; border-radius: 8px; margin: 20px 0; }
            label { display: block; margin: 12px 0 4px; font-weight: bold; }
            input[type=text] { width: 100%; padding: 8px; }
            button { margin-top: 16px; padding: 8px 24px; }
        </style>
    </head>
    <body>
        <h1>Lesson Plan Generator</h1>

        <div class="info-box">
            <p>Enter a prompt to guide the content generation. Optionally upload a
            .docx template whose headings, paragraphs and tables will structure
            the generated plan. The result downloads as a Word document.</p>
        </div>

        <form action="/generate" method="post" enctype="multipart/form-data">
            <label for="prompt">Prompt</label>
            <input type="text" id="prompt" name="prompt"
                   placeholder="e.g. a 45-minute B1 lesson on irregular verbs">

            <label for="template_file">Template document (optional)</label>
            <input type="file" id="template_file" name="template_file" accept=".docx">

            <button type="submit">Generate Lesson Plan</button>
        </form>
    </body>
    </html>
    "#,
    )
}

async fn health_check() -> &'static str {
    "OK"
}

/// Run the whole pipeline for one form submission and answer with the
/// generated document as an attachment. Nothing is persisted server-side;
/// the activity log append is a best-effort side effect.
async fn generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut user_prompt: Option<String> = None;
    let mut template_blocks: Option<Vec<TemplateBlock>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InputValidation(format!("unreadable form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InputValidation(format!("unreadable prompt field: {e}")))?;
                user_prompt = Some(text);
            }
            "template_file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InputValidation(format!("unreadable upload: {e}")))?;
                // Browsers submit an empty part when no file was chosen.
                if !data.is_empty() {
                    template_blocks = Some(template::extract_blocks(&data)?);
                }
            }
            _ => {}
        }
    }

    let user_prompt = user_prompt.ok_or_else(|| {
        AppError::InputValidation("Enter a prompt to guide the content generation.".into())
    })?;

    let request_id = uuid::Uuid::new_v4();
    tracing::info!(%request_id, template = template_blocks.is_some(), "generating lesson plan");

    let rendered_template = match &template_blocks {
        Some(blocks) => prompt::render_template_blocks(blocks),
        None => prompt::fixed_skeleton(),
    };
    let full_prompt = prompt::build_prompt(&user_prompt, &rendered_template);

    let raw = state.llm_client.complete(prompt::SYSTEM_MESSAGE, &full_prompt).await?;

    let mut sections = segmenter::split_sections(&raw);
    segmenter::apply_substitutions(&mut sections);

    let document = match &template_blocks {
        Some(blocks) => assembler::assemble_from_template(blocks, &sections),
        None => assembler::assemble_freeform(&sections),
    };

    let bytes = docx::write_docx(&document)?;
    let filename =
        format!("{}.docx", assembler::sanitize_filename(&assembler::detect_title(&sections)));

    if let Err(err) = state.logger.append(&user_prompt, &sections) {
        tracing::warn!(%request_id, error = %err, "failed to append activity log row");
    }

    tracing::info!(%request_id, sections = sections.len(), bytes = bytes.len(), %filename, "lesson plan ready");

    let headers = [
        (CONTENT_TYPE, DOCX_MIME.to_string()),
        (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ];
    Ok((headers, bytes).into_response())
}
