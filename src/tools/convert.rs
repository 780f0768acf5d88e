use super::{DocumentTools, ToolError, ToolResult, file_name, read_input};
use crate::analysis::PDF_MIME_TYPE;
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};
use std::path::Path;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 40;
const TOP_LINE: i64 = 750;
const BOTTOM_MARGIN: f64 = 40.0;
const FONT_SIZE: i64 = 12;
const LEADING: f64 = 14.4;

const LINES_PER_PAGE: usize = ((TOP_LINE as f64 - BOTTOM_MARGIN) / LEADING) as usize + 1;

impl DocumentTools {
    /// Render a text file as a PDF and upload it.
    ///
    /// `bucket` overrides the configured intake bucket.
    pub async fn convert_and_upload(&self, path: &Path, bucket: Option<&str>) -> ToolResult {
        match self.try_convert(path, bucket).await {
            Ok(gcs_path) => ToolResult::success(gcs_path, None),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Convert tool failed");
                error.into()
            }
        }
    }

    async fn try_convert(&self, path: &Path, bucket: Option<&str>) -> Result<String, ToolError> {
        let bucket = self.resolve_bucket(bucket)?;
        let bytes = read_input(path).await?;
        let object = pdf_object_name(&file_name(path)?);
        let text = String::from_utf8_lossy(&bytes);
        let pdf = render_text_pdf(&text)?;
        tracing::debug!(object = %object, bytes = pdf.len(), "Rendered text as PDF");

        Ok(self
            .storage
            .upload(bucket, &object, PDF_MIME_TYPE, pdf)
            .await?)
    }
}

/// Object name for a converted file: a trailing `.txt` becomes `.pdf`, anything else gains it.
pub fn pdf_object_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    format!("{stem}.pdf")
}

/// Render plain text onto US-Letter pages in 12pt Helvetica.
///
/// Lines are laid out top-down from (40, 750) and wrap onto a new page when they would cross
/// the bottom margin. Characters outside Latin-1 are replaced with `?`.
pub fn render_text_pdf(text: &str) -> Result<Vec<u8>, ToolError> {
    let lines: Vec<&str> = text.lines().collect();
    let chunks: Vec<&[&str]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding"
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id }
    });

    let mut kids = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let content = Content {
            operations: page_operations(chunk),
        };
        let encoded = content
            .encode()
            .map_err(|error| ToolError::Render(error.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()]
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|error| ToolError::Render(error.to_string()))?;
    Ok(buffer)
}

fn page_operations(lines: &[&str]) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![Object::Real(LEADING as _)]),
        Operation::new("Td", vec![LEFT_MARGIN.into(), TOP_LINE.into()]),
    ];
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(latin1(line))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

fn latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}
