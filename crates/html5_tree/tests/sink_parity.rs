//! The arena sink and the patch sink must describe the same document.

use html5_tree::dom_snapshot::DomSnapshot;
use html5_tree::html5::{
    Html5TreeBuilder, PatchTreeSink, QuirksMode, TreeBuilderConfig, VecPatchSink,
};
use html5_tree::{ArenaDom, DomPatch};
use html5_tree_test_support::{diff_lines, drive, snapshot_lines};

const INPUTS: &[&str] = &[
    "<!DOCTYPE html><p>One<p>Two",
    "Hello <b>world</b>",
    "<!DOCTYPE html><table>x<tr><td>y</table>z",
    "<!DOCTYPE html><table><tr>a<td>b</td>c</tr></table>",
    "<!DOCTYPE html><b>1<p>2</b>3</p>",
    "<!DOCTYPE html><a><p>X<a>Y</a>Z</p></a>",
    "<!DOCTYPE html><p><b><b><b><b>x</p>y",
    "<!DOCTYPE html><div><i><b>x</div>y</i>z",
    "<!DOCTYPE html><svg viewbox='0 0 1 1'><foreignobject><p>x</svg>after",
    "<!DOCTYPE html><math><mi>x</mi><annotation-xml encoding=text/html><p>y</math>",
    "<!DOCTYPE html><select><option>a<optgroup><option>b</select>",
    "<!DOCTYPE html><html lang=en><body class=a><html dir=rtl><body id=b>",
    "<!DOCTYPE html><frameset><frame><noframes>x</noframes></frameset><!--after-->",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\"><p><table>",
    "<!--c--><title>t</title><script>if (a < b) {}</script><style>p{}</style>",
    "<!DOCTYPE html><textarea>\nx</textarea><pre>\n\ny</pre>",
    "<!DOCTYPE html><table><caption>c<td>x</table><table><colgroup><col></table>",
];

fn arena_output(input: &str) -> (Vec<String>, QuirksMode) {
    let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), ArenaDom::new());
    drive(&mut builder, input, None).expect("arena parse");
    let dom = builder.into_sink();
    let quirks = dom.quirks_mode();
    (snapshot_lines(&DomSnapshot::document(&dom.into_node())), quirks)
}

fn patches_for(input: &str) -> Vec<DomPatch> {
    let sink = PatchTreeSink::new(Vec::new(), true);
    let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
    drive(&mut builder, input, None).expect("patch parse");
    builder.into_sink().into_inner()
}

fn replayed_output(patches: &[DomPatch]) -> (Vec<String>, QuirksMode) {
    let dom = ArenaDom::from_patches(patches).expect("patch stream replays");
    let quirks = dom.quirks_mode();
    (snapshot_lines(&DomSnapshot::document(&dom.into_node())), quirks)
}

#[test]
fn patch_replay_matches_arena_dom() {
    for input in INPUTS {
        let (expected, expected_quirks) = arena_output(input);
        let (actual, actual_quirks) = replayed_output(&patches_for(input));
        assert!(
            expected == actual,
            "sink mismatch for {input:?}\n{}",
            diff_lines(&expected, &actual)
        );
        assert_eq!(expected_quirks, actual_quirks, "compat mode for {input:?}");
    }
}

#[test]
fn patch_stream_starts_with_document() {
    for input in INPUTS {
        let patches = patches_for(input);
        assert!(
            matches!(patches.first(), Some(DomPatch::CreateDocument { .. })),
            "first patch for {input:?}: {:?}",
            patches.first()
        );
        let documents = patches
            .iter()
            .filter(|patch| matches!(patch, DomPatch::CreateDocument { .. }))
            .count();
        assert_eq!(documents, 1, "{input:?}");
    }
}

#[test]
fn borrowed_vec_sink_collects_the_same_stream() {
    let input = INPUTS[2];
    let owned = patches_for(input);
    let mut borrowed = Vec::new();
    {
        let sink = PatchTreeSink::new(VecPatchSink(&mut borrowed), true);
        let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
        drive(&mut builder, input, None).expect("patch parse");
    }
    assert_eq!(owned, borrowed);
}

#[test]
fn quirky_doctype_is_reported_through_patches() {
    let patches = patches_for(INPUTS[13]);
    assert!(patches.iter().any(|patch| matches!(
        patch,
        DomPatch::SetCompatMode {
            mode: QuirksMode::Quirks
        }
    )));
}

#[test]
fn uncoalesced_stream_still_replays() {
    let input = "<!DOCTYPE html><p>a<!--c-->b";
    let sink = PatchTreeSink::new(Vec::new(), false);
    let mut builder = Html5TreeBuilder::new(TreeBuilderConfig::default(), sink);
    drive(&mut builder, input, None).expect("patch parse");
    let patches = builder.into_sink().into_inner();
    assert!(
        !patches
            .iter()
            .any(|patch| matches!(patch, DomPatch::SetText { .. }))
    );
    let (actual, _) = replayed_output(&patches);
    let (expected, _) = arena_output(input);
    assert_eq!(actual, expected);
}
