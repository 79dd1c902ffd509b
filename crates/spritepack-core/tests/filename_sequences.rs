use spritepack_core::filename::FilenameSequence;

#[test]
fn bounded_sequence() {
    let seq = FilenameSequence::new("atlas{0-9}.png");
    assert_eq!(seq.count(), 10);
    assert_eq!(seq.get_nth_filename(0), "atlas0.png");
    assert_eq!(seq.get_nth_filename(9), "atlas9.png");
    assert_eq!(seq.filename(), "atlas0.png");
    assert_eq!(seq.pattern(), "atlas{0-9}.png");
}

#[test]
fn zero_padded_sequence() {
    let seq = FilenameSequence::new("sheet{08-11}.png");
    assert_eq!(seq.count(), 4);
    assert_eq!(seq.get_nth_filename(0), "sheet08.png");
    assert_eq!(seq.get_nth_filename(3), "sheet11.png");
}

#[test]
fn unbounded_sequence() {
    let seq = FilenameSequence::new("tex{0-}.png");
    assert_eq!(seq.count(), usize::MAX);
    assert_eq!(seq.get_nth_filename(12), "tex12.png");
}

#[test]
fn plain_filename_counts_one() {
    let seq = FilenameSequence::new("single.png");
    assert_eq!(seq.count(), 1);
    assert_eq!(seq.get_nth_filename(0), "single.png");
    assert_eq!(seq.pattern(), "single.png");
}

#[test]
fn malformed_runs_fall_back_to_plain() {
    let seq = FilenameSequence::new("bad{a-b}.png");
    assert_eq!(seq.count(), 1);
    assert_eq!(seq.get_nth_filename(0), "bad{a-b}.png");

    let seq = FilenameSequence::new("bad{9-2}.png");
    assert_eq!(seq.count(), 1);
    assert_eq!(seq.get_nth_filename(0), "bad{9-2}.png");
}
