//! End-to-end tests: caller VCFs + reference -> merged consensus VCF

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use omic_core::ReferenceIndex;
use omic_picking::{PickingError, Source, merge};
use tempfile::tempdir;

const COLUMNS: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

fn write_reference(dir: &Path) -> ReferenceIndex {
    let fasta = dir.join("ref.fa");
    let mut f = File::create(&fasta).unwrap();
    // chr10 is listed last so contig order differs from lexicographic order
    write!(f, ">chr1\n{}\n>chr2\n{}\n>chr10\n{}\n", "A".repeat(300), "C".repeat(200), "G".repeat(100))
        .unwrap();
    ReferenceIndex::from_path(&fasta).unwrap()
}

fn write_vcf(dir: &Path, name: &str, records: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    writeln!(f, "##fileformat=VCFv4.2").unwrap();
    writeln!(f, "{}", COLUMNS).unwrap();
    for record in records {
        writeln!(f, "{}", record).unwrap();
    }
    path
}

fn data_lines(path: &Path) -> Vec<String> {
    let text = std::fs::read_to_string(path).unwrap();
    text.lines()
        .filter(|l| !l.starts_with('#'))
        .map(String::from)
        .collect()
}

#[test]
fn test_snv_threshold_keeps_only_agreed_call() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![
        Source::new("source1", write_vcf(dir.path(), "s1.vcf", &["chr1\t100\t.\tA\tT\t.\tPASS\t."])),
        Source::new("source2", write_vcf(dir.path(), "s2.vcf", &["chr1\t100\t.\tA\tT\t.\tPASS\t."])),
        Source::new("source3", write_vcf(dir.path(), "s3.vcf", &["chr1\t100\t.\tA\tG\t.\tPASS\t."])),
    ];

    let output = dir.path().join("picked.vcf");
    let outcome = merge(&reference, &sources, 2, 1, &output).unwrap();

    assert_eq!(outcome.path, output);
    assert_eq!(outcome.summary.distinct_keys, 2);
    assert_eq!(outcome.summary.retained_snvs, 1);
    assert_eq!(
        data_lines(&output),
        vec!["chr1\t100\t.\tA\tT\t.\tPASS\tSUPPORT=2;CALLERS=source1,source2"]
    );
}

#[test]
fn test_differently_encoded_deletion_collapses() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![
        Source::new("source1", write_vcf(dir.path(), "s1.vcf", &["chr2\t50\t.\tAT\tA\t60\tPASS\tDP=30"])),
        Source::new("source2", write_vcf(dir.path(), "s2.vcf", &["chr2\t51\t.\tT\t-\t12\tPASS\t."])),
    ];

    let output = dir.path().join("picked.vcf");
    let outcome = merge(&reference, &sources, 1, 2, &output).unwrap();

    assert_eq!(outcome.summary.distinct_keys, 1);
    assert_eq!(outcome.summary.retained_indels, 1);
    // the anchored record from the higher-priority source is written
    assert_eq!(
        data_lines(&output),
        vec!["chr2\t50\t.\tAT\tA\t60\tPASS\tDP=30;SUPPORT=2;CALLERS=source1,source2"]
    );
}

#[test]
fn test_padded_snv_matches_across_sources() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![
        Source::new("vardict", write_vcf(dir.path(), "vardict.vcf", &["chr1\t10\t.\tGA\tGC\t.\tPASS\t."])),
        Source::new("muse", write_vcf(dir.path(), "muse.vcf", &["chr1\t11\t.\tA\tC\t.\tPASS\t."])),
    ];

    let output = dir.path().join("picked.vcf");
    merge(&reference, &sources, 2, 2, &output).unwrap();
    assert_eq!(
        data_lines(&output),
        vec!["chr1\t10\t.\tGA\tGC\t.\tPASS\tSUPPORT=2;CALLERS=vardict,muse"]
    );
}

#[test]
fn test_duplicate_report_in_one_source_counts_once() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    // the same SNV twice: once on its own, once out of a multi-allelic line
    let sources = vec![Source::new(
        "mutect2",
        write_vcf(
            dir.path(),
            "mutect2.vcf",
            &["chr1\t20\t.\tC\tT\t.\tPASS\t.", "chr1\t20\t.\tC\tT,G\t.\tPASS\t."],
        ),
    )];

    let output = dir.path().join("picked.vcf");
    let outcome = merge(&reference, &sources, 2, 1, &output).unwrap();

    assert_eq!(outcome.summary.raw_calls, 3);
    assert_eq!(outcome.summary.distinct_keys, 2);
    assert!(data_lines(&output).is_empty());
}

#[test]
fn test_output_sorted_by_contig_order_position_and_alt() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![
        Source::new(
            "lofreq",
            write_vcf(
                dir.path(),
                "lofreq.vcf",
                &[
                    "chr10\t5\t.\tG\tA\t.\tPASS\t.",
                    "chr2\t7\t.\tC\tT\t.\tPASS\t.",
                    "chr1\t200\t.\tA\tT\t.\tPASS\t.",
                ],
            ),
        ),
        Source::new(
            "varscan",
            write_vcf(
                dir.path(),
                "varscan.vcf",
                &["chr1\t200\t.\tA\tG\t.\tPASS\t.", "chr1\t3\t.\tA\tC\t.\tPASS\t."],
            ),
        ),
    ];

    let output = dir.path().join("picked.vcf");
    merge(&reference, &sources, 1, 1, &output).unwrap();

    let positions: Vec<String> = data_lines(&output)
        .iter()
        .map(|l| l.split('\t').take(5).collect::<Vec<_>>().join(":"))
        .collect();
    assert_eq!(
        positions,
        vec![
            "chr1:3:.:A:C",
            "chr1:200:.:A:G",
            "chr1:200:.:A:T",
            "chr2:7:.:C:T",
            "chr10:5:.:G:A",
        ]
    );
}

#[test]
fn test_padded_mnv_written_in_position_order() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    // CAAAT>CAAAG normalizes to chr1:5 T>G but keeps POS 1 in the output
    let sources = vec![Source::new(
        "vardict",
        write_vcf(
            dir.path(),
            "vardict.vcf",
            &["chr1\t3\t.\tA\tT\t.\tPASS\t.", "chr1\t1\t.\tCAAAT\tCAAAG\t.\tPASS\t."],
        ),
    )];

    let output = dir.path().join("picked.vcf");
    merge(&reference, &sources, 1, 1, &output).unwrap();

    let positions: Vec<u64> = data_lines(&output)
        .iter()
        .map(|l| l.split('\t').nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(positions, vec![1, 3]);
}

#[test]
fn test_zero_sources_writes_header_only() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let output = dir.path().join("empty.vcf");
    let outcome = merge(&reference, &[], 1, 1, &output).unwrap();

    assert_eq!(outcome.summary.sources, 0);
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("##fileformat=VCFv4.2\n##contig=<ID=chr1,length=300>\n"));
    assert!(text.ends_with(&format!("{}\n", COLUMNS)));
    assert!(data_lines(&output).is_empty());
}

#[test]
fn test_unknown_contig_aborts_without_output() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![Source::new(
        "muse",
        write_vcf(dir.path(), "muse.vcf", &["chrUn_1\t5\t.\tA\tC\t.\tPASS\t."]),
    )];

    let output = dir.path().join("picked.vcf");
    let err = merge(&reference, &sources, 1, 1, &output).unwrap_err();
    match err {
        PickingError::UnknownContig { chrom, .. } => assert_eq!(chrom, "chrUn_1"),
        other => panic!("expected UnknownContig, got {}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_malformed_record_aborts_without_output() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let sources = vec![
        Source::new("good", write_vcf(dir.path(), "good.vcf", &["chr1\t5\t.\tA\tC\t.\tPASS\t."])),
        Source::new("bad", write_vcf(dir.path(), "bad.vcf", &["chr1\tfive\t.\tA\tC\t.\tPASS\t."])),
    ];

    let output = dir.path().join("picked.vcf");
    let err = merge(&reference, &sources, 1, 1, &output).unwrap_err();
    match err {
        PickingError::MalformedRecord {
            source_name,
            line_number,
            ..
        } => {
            assert_eq!(source_name, "bad");
            assert_eq!(line_number, 3);
        }
        other => panic!("expected MalformedRecord, got {}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_gzipped_input_and_output_with_genotypes() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let gz_path = dir.path().join("mutect2.vcf.gz");
    {
        let mut encoder = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
        writeln!(encoder, "##fileformat=VCFv4.2").unwrap();
        writeln!(encoder, "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">").unwrap();
        writeln!(encoder, "{}\tFORMAT\tTUMOR", COLUMNS).unwrap();
        writeln!(encoder, "chr1\t42\t.\tT\tTA\t33\tPASS\tSOMATIC\tGT\t0/1").unwrap();
        encoder.finish().unwrap();
    }

    let sources = vec![Source::from_path(&gz_path).unwrap()];
    let output = dir.path().join("picked.vcf.gz");
    merge(&reference, &sources, 1, 1, &output).unwrap();

    let mut text = String::new();
    MultiGzDecoder::new(File::open(&output).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"));
    assert!(lines.contains(&"#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tTUMOR"));
    assert_eq!(
        *lines.last().unwrap(),
        "chr1\t42\t.\tT\tTA\t33\tPASS\tSOMATIC;SUPPORT=1;CALLERS=mutect2\tGT\t0/1"
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    let reference = write_reference(dir.path());

    let records_a = ["chr1\t10\t.\tA\tC\t10\tPASS\tDP=1", "chr2\t5\t.\tCA\tC\t10\tPASS\t."];
    let records_b = ["chr1\t10\t.\tA\tC\t20\tLowQual\tDP=2", "chr2\t6\t.\tA\t-\t20\tPASS\t."];
    let records_c = ["chr1\t9\t.\tTA\tTC\t30\tPASS\tDP=3"];
    let sources = vec![
        Source::new("a", write_vcf(dir.path(), "a.vcf", &records_a)),
        Source::new("b", write_vcf(dir.path(), "b.vcf", &records_b)),
        Source::new("c", write_vcf(dir.path(), "c.vcf", &records_c)),
    ];

    let first = dir.path().join("first.vcf");
    merge(&reference, &sources, 1, 1, &first).unwrap();
    let expected = std::fs::read_to_string(&first).unwrap();
    assert!(expected.contains("chr1\t10\t.\tA\tC\t10\tPASS\tDP=1;SUPPORT=3;CALLERS=a,b,c"));
    assert!(expected.contains("chr2\t5\t.\tCA\tC\t10\tPASS\tSUPPORT=2;CALLERS=a,b"));

    for run in 0..5 {
        let path = dir.path().join(format!("run{}.vcf", run));
        merge(&reference, &sources, 1, 1, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
    }
}
