use criterion::{Criterion, black_box, criterion_group, criterion_main};
use editor_fold_core::{
    FoldingDescriptor, Tag, Tree, TreeBuilder, compute_folding_ranges, match_delimiters,
};

struct Source {
    builder: TreeBuilder,
    text: String,
    offset: usize,
}

impl Source {
    fn leaf(&mut self, tags: &[Tag], s: &str) {
        self.builder.leaf(tags.iter().cloned(), self.offset, s);
        self.text.push_str(s);
        self.offset += s.chars().count();
    }

    fn open(&mut self, tag: Tag) {
        self.builder.start_node([tag], self.offset);
    }

    fn close(&mut self) {
        self.builder.finish_node(self.offset);
    }
}

/// `form_count` multi-line forms of the shape `(defn fN [x]\n  (str "x(" x))`.
fn large_tree(form_count: usize) -> Tree {
    let mut src = Source {
        builder: TreeBuilder::new(),
        text: String::new(),
        offset: 0,
    };

    for i in 0..form_count {
        src.open(Tag::LIST);
        src.leaf(&[Tag::PAREN, Tag::LIST], "(");
        src.leaf(&[Tag::SYMBOL], "defn");
        src.leaf(&[Tag::WHITESPACE], " ");
        src.leaf(&[Tag::SYMBOL], &format!("f{i}"));
        src.leaf(&[Tag::WHITESPACE], " ");
        src.open(Tag::VECTOR);
        src.leaf(&[Tag::BRACKET, Tag::VECTOR], "[");
        src.leaf(&[Tag::SYMBOL], "x");
        src.leaf(&[Tag::BRACKET, Tag::VECTOR], "]");
        src.close();
        src.leaf(&[Tag::WHITESPACE], "\n  ");
        src.open(Tag::LIST);
        src.leaf(&[Tag::PAREN, Tag::LIST], "(");
        src.leaf(&[Tag::SYMBOL], "str");
        src.leaf(&[Tag::WHITESPACE], " ");
        src.open(Tag::STRING);
        src.leaf(&[Tag::STRING_DELIMITER, Tag::STRING], "\"");
        src.leaf(&[Tag::STRING_BODY], "x(");
        src.leaf(&[Tag::STRING_DELIMITER, Tag::STRING], "\"");
        src.close();
        src.leaf(&[Tag::WHITESPACE], " ");
        src.leaf(&[Tag::SYMBOL], "x");
        src.leaf(&[Tag::PAREN, Tag::LIST], ")");
        src.close();
        src.leaf(&[Tag::PAREN, Tag::LIST], ")");
        src.close();
        src.leaf(&[Tag::WHITESPACE], "\n\n");
    }

    src.builder.finish(src.text, 0, false)
}

fn bench_match_delimiters(c: &mut Criterion) {
    let tree = large_tree(20_000);
    c.bench_function("match_delimiters/20k_forms", |b| {
        b.iter(|| black_box(match_delimiters(black_box(&tree).leaves()).len()))
    });
}

fn bench_deep_nesting(c: &mut Criterion) {
    let depth = 100_000;
    let mut builder = TreeBuilder::new();
    for offset in 0..depth {
        builder.leaf([Tag::PAREN], offset, "(");
    }
    for offset in depth..depth * 2 {
        builder.leaf([Tag::PAREN], offset, ")");
    }
    let text = "(".repeat(depth) + &")".repeat(depth);
    let tree = builder.finish(text, 0, false);

    c.bench_function("match_delimiters/100k_deep", |b| {
        b.iter(|| black_box(match_delimiters(black_box(&tree).leaves()).len()))
    });
}

fn bench_folding_policy(c: &mut Criterion) {
    let tree = large_tree(20_000);
    let mut descriptors = FoldingDescriptor::defaults();
    for descriptor in &mut descriptors {
        descriptor.enabled = true;
    }

    c.bench_function("compute_folding_ranges/20k_forms_all_descriptors", |b| {
        b.iter(|| black_box(compute_folding_ranges(Some(black_box(&tree)), &descriptors).len()))
    });
}

criterion_group!(
    benches,
    bench_match_delimiters,
    bench_deep_nesting,
    bench_folding_policy
);
criterion_main!(benches);
