use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::xref::XrefType;
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use super::Composite;
use crate::error::{RenderError, RenderResult};
use crate::layout::{COLUMNS, ROWS};

const POINTS_PER_INCH: f32 = 72.0;

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

fn pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

/// Write the composite as a one-page PDF.
pub(super) fn write_pdf(composite: &Composite) -> RenderResult<Vec<u8>> {
    let geometry = &composite.geometry;
    let page_width = pt(geometry.page_width);
    let page_height = pt(geometry.page_height);
    // Page inches measured from the top to PDF points measured from the bottom
    let pdf_y = |inches: f32| page_height - pt(inches);

    let mut doc = Document::with_version("1.4");
    doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
    let id_pages = doc.new_object_id();

    let mut xobjects = Dictionary::new();
    let mut ops = Vec::new();

    for (index, panel) in composite.panels.iter().enumerate() {
        let name = format!("P{index}");
        let (width, height) = panel.image.dimensions();
        let rgb: Vec<u8> = panel
            .image
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let id_image = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb,
        ));
        xobjects.set(name.clone(), id_image);

        let cell = geometry.cell_rect(panel.row, panel.col);
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                pt(cell.width()).into(),
                0.into(),
                0.into(),
                pt(cell.height()).into(),
                pt(cell.min.x).into(),
                pdf_y(cell.max.y).into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
    }

    cut_guide_ops(composite, &mut ops);

    let content = Content { operations: ops };
    let id_content = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_error)?));
    let id_resources = doc.add_object(dictionary! {
        "XObject" => xobjects,
    });
    let id_page = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => id_pages,
        "Contents" => id_content,
        "Resources" => id_resources,
    });
    doc.set_object(
        id_pages,
        dictionary! {
            "Type" => "Pages",
            "Count" => 1,
            "Kids" => vec![id_page.into()],
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
        },
    );

    let id_catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => id_pages,
    });
    doc.trailer.set("Root", id_catalog);

    let date = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let id_info = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Magic Fold Zine"),
        "Creator" => Object::string_literal(concat!("zine_fold ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(date.clone()),
        "ModDate" => Object::string_literal(date),
    });
    doc.trailer.set("Info", id_info);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

/// Dashed lines along the inner cell boundaries and a solid border around the grid.
fn cut_guide_ops(composite: &Composite, ops: &mut Vec<Operation>) {
    let geometry = &composite.geometry;
    let guides = &composite.guides;
    let page_height = pt(geometry.page_height);
    let grid = geometry.grid_rect();
    let gray = f32::from(guides.gray) / 255.0;

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("RG", vec![gray.into(), gray.into(), gray.into()]));
    ops.push(Operation::new("w", vec![pt(guides.width_in).into()]));
    ops.push(Operation::new(
        "d",
        vec![
            Object::Array(vec![pt(guides.dash_in[0]).into(), pt(guides.dash_in[1]).into()]),
            0.into(),
        ],
    ));

    let mut line = |x1: f32, y1: f32, x2: f32, y2: f32| {
        ops.push(Operation::new("m", vec![pt(x1).into(), (page_height - pt(y1)).into()]));
        ops.push(Operation::new("l", vec![pt(x2).into(), (page_height - pt(y2)).into()]));
        ops.push(Operation::new("S", vec![]));
    };
    for row in 1..ROWS {
        let y = geometry.origin_y + row as f32 * geometry.cell_height;
        line(grid.min.x, y, grid.max.x, y);
    }
    for col in 1..COLUMNS {
        let x = geometry.origin_x + col as f32 * geometry.cell_width;
        line(x, grid.min.y, x, grid.max.y);
    }

    ops.push(Operation::new("d", vec![Object::Array(vec![]), 0.into()]));
    ops.push(Operation::new(
        "re",
        vec![
            pt(grid.min.x).into(),
            (page_height - pt(grid.max.y)).into(),
            pt(grid.width()).into(),
            pt(grid.height()).into(),
        ],
    ));
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
}
