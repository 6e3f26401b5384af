// Public segmentation API as used by embedders plugging in their own classifier
// WHY: the bundled detector must always hand back spans that slice the input exactly

use threatlens::sentence_detector::{ByteSpan, SentenceDetector, SentenceSegmenter};

const EMAIL: &str = "Dear Mr. Jones,\n\nWe detected unusual activity on your account! \
Please verify your identity at http://secure-login.example.com/verify.html within 24 hours. \
Failure to do so (e.g. ignoring this notice) will result in suspension.\n\n\
Regards,\nAccount Security Team";

#[test]
fn test_email_segmentation() {
    let detector = SentenceDetector::new().expect("detector should compile");
    let sentences = detector.segment(EMAIL).expect("segmentation should succeed");

    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Dear Mr. Jones,",
            "We detected unusual activity on your account!",
            "Please verify your identity at http://secure-login.example.com/verify.html within 24 hours.",
            "Failure to do so (e.g. ignoring this notice) will result in suspension.",
            "Regards,\nAccount Security Team",
        ]
    );
}

#[test]
fn test_spans_are_ordered_and_exact() {
    let detector = SentenceDetector::new().expect("detector should compile");
    let sentences = detector.segment(EMAIL).expect("segmentation should succeed");

    let mut previous_end = 0;
    for (i, sentence) in sentences.iter().enumerate() {
        assert_eq!(sentence.index, i);
        let span: ByteSpan = sentence.span.expect("bundled detector reports spans");
        assert!(span.start >= previous_end, "spans must not overlap");
        assert_eq!(span.slice(EMAIL), Some(sentence.text.as_str()));
        previous_end = span.end;
    }
}

#[test]
fn test_detector_is_reusable() {
    let detector = SentenceDetector::new().expect("detector should compile");
    let first = detector.segment("One. Two.").unwrap();
    let second = detector.segment("Three? Four!").unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(second[1].text, "Four!");
}
