use egui::{Pos2, pos2, vec2};
use futures::executor::block_on;
use zine_fold::config::EditorConfig;
use zine_fold::editor::{Key, PanelEditor, Tool};
use zine_fold::scene::{Element, Scene};
use zine_fold::zine::PanelPosition;

// Text objects are always interactive; everything else only outside text mode.
fn assert_selectability(editor: &PanelEditor) {
    let text_mode = editor.tool() == Tool::Text;
    for object in &editor.scene().objects {
        let interactivity = object.interactivity();
        let expected = object.is_text() || !text_mode;
        assert_eq!(
            interactivity.is_interactive(),
            expected,
            "{} object with tool {}",
            object.element_type(),
            editor.tool()
        );
        assert_eq!(interactivity.selectable, interactivity.evented);
    }
}

fn ready_editor(scene: Option<&str>) -> PanelEditor {
    let mut editor = PanelEditor::new(PanelPosition::One, &EditorConfig::default());
    block_on(editor.initialize(scene)).unwrap();
    editor
}

fn stroke(editor: &mut PanelEditor, from: Pos2, to: Pos2) {
    editor.pointer_down(from).unwrap();
    editor.pointer_move(to).unwrap();
    editor.pointer_up(to).unwrap();
}

#[test]
fn test_selectability_holds_across_tool_sequences() {
    let tools = [Tool::Pencil, Tool::Eraser, Tool::Text];
    // Small LCG so the sequence is reproducible without extra crates
    let mut seed: u32 = 0x2545_f491;
    let mut next = move || {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (seed >> 16) as usize
    };

    let mut editor = ready_editor(None);
    for step in 0..200 {
        let x = (next() % 400) as f32 + 10.0;
        let y = (next() % 550) as f32 + 10.0;
        match next() % 5 {
            0 => editor.set_tool(tools[next() % tools.len()]).unwrap(),
            1 | 2 => stroke(&mut editor, pos2(x, y), pos2(x + 15.0, y + 10.0)),
            3 => {
                editor.pointer_down(pos2(x, y)).unwrap();
                editor.pointer_up(pos2(x, y)).unwrap();
            }
            _ => {
                editor.key_down(Key::Escape).unwrap();
            }
        }
        assert_selectability(&editor);
        if step % 50 == 49 {
            let json = editor.serialize().unwrap();
            let tool = editor.tool();
            editor = ready_editor(Some(&json));
            editor.set_tool(tool).unwrap();
            assert_selectability(&editor);
        }
    }
    assert!(!editor.scene().is_empty());
}

#[test]
fn test_loaded_scene_follows_text_mode() {
    let mut source = ready_editor(None);
    stroke(&mut source, pos2(10.0, 10.0), pos2(80.0, 90.0));
    source.set_tool(Tool::Text).unwrap();
    source.pointer_down(pos2(200.0, 200.0)).unwrap();
    source.type_text("caption").unwrap();
    let json = source.serialize().unwrap();

    let mut editor = ready_editor(Some(&json));
    assert_eq!(editor.scene().objects.len(), 2);
    assert_selectability(&editor);

    editor.set_tool(Tool::Text).unwrap();
    assert_selectability(&editor);
    let interactive: Vec<bool> = editor
        .scene()
        .objects
        .iter()
        .map(|o| o.interactivity().is_interactive())
        .collect();
    assert_eq!(interactive, vec![false, true]);

    // New paths drawn after leaving text mode are interactive again
    editor.set_tool(Tool::Pencil).unwrap();
    stroke(&mut editor, pos2(300.0, 300.0), pos2(350.0, 320.0));
    assert_selectability(&editor);
}

#[test]
fn test_text_can_be_dragged_in_any_mode() {
    let mut editor = ready_editor(None);
    editor.set_tool(Tool::Text).unwrap();
    editor.pointer_down(pos2(100.0, 100.0)).unwrap();
    let id = editor.active_object().unwrap();
    editor.key_down(Key::Escape).unwrap();

    editor.move_object(id, vec2(10.0, 0.0)).unwrap();
    editor.set_tool(Tool::Eraser).unwrap();
    editor.move_object(id, vec2(0.0, 10.0)).unwrap();

    let json = editor.serialize().unwrap();
    let scene = Scene::from_json(&json).unwrap();
    assert_eq!(scene.objects[0].rect().min, pos2(110.0, 110.0));
}
