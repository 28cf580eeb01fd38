//! 拼音注音引擎
//!
//! `enable` 把含汉字的文本节点替换为 `<ruby data-pinyin-added="1">字<rt>读音</rt></ruby>`
//! 序列，`disable` 把这些区域还原为纯文本并规范化相邻文本节点。两者满足
//! `disable(enable(D)) == D`，且连续两次 `enable` 与一次的结果相同。

use markup5ever_rcdom::Handle;

use super::classifier::contains_target_script;
use super::scanner::{scan, ExclusionPolicy};
use super::segmenter::{phoneticize, split_runs, PhoneticUnit, Phoneticizer};
use crate::parsers::html::{
    append_child, closest, create_element, create_text, find_elements, get_node_name,
    get_parent_node, get_text, has_node_attr, normalize, replace_node, set_text, text_content,
    ANNOTATION_ATTR,
};

/// 一次 `enable` 的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// 扫描得到的候选文本节点
    pub nodes_scanned: usize,
    /// 被替换的文本节点
    pub nodes_annotated: usize,
    /// 新建的注音区域
    pub regions_created: usize,
    /// 注音失败而保留为纯文本的汉字片段
    pub runs_skipped: usize,
}

/// 注音引擎
pub struct AnnotationEngine<P> {
    phoneticizer: P,
    policy: ExclusionPolicy,
}

impl<P: Phoneticizer> AnnotationEngine<P> {
    pub fn new(phoneticizer: P) -> Self {
        Self::with_policy(phoneticizer, ExclusionPolicy::default())
    }

    pub fn with_policy(phoneticizer: P, policy: ExclusionPolicy) -> Self {
        Self {
            phoneticizer,
            policy,
        }
    }

    /// 为 `root` 下的汉字添加拼音
    pub fn enable(&self, root: &Handle) -> AnnotationReport {
        let mut report = AnnotationReport::default();

        // 先收集再修改，替换节点会让遍历游标失效
        let candidates = scan(root, &self.policy);
        report.nodes_scanned = candidates.len();

        for node in &candidates {
            self.annotate_node(node, &mut report);
        }

        tracing::info!(
            "拼音注音完成: 扫描 {} 个文本节点，替换 {} 个，新建 {} 个注音区域，跳过 {} 个片段",
            report.nodes_scanned,
            report.nodes_annotated,
            report.regions_created,
            report.runs_skipped
        );

        report
    }

    /// 移除 `root` 下的所有注音区域，返回移除数量
    pub fn disable(&self, root: &Handle) -> usize {
        let regions = find_elements(root, |node| has_node_attr(node, ANNOTATION_ATTR));

        for region in &regions {
            let glyph = region
                .children
                .borrow()
                .first()
                .map(text_content)
                .unwrap_or_default();
            replace_node(region, vec![create_text(&glyph)]);
        }

        normalize(root);

        tracing::info!("已移除 {} 个注音区域", regions.len());
        regions.len()
    }

    fn annotate_node(&self, node: &Handle, report: &mut AnnotationReport) {
        let Some(text) = get_text(node) else {
            return;
        };
        if !contains_target_script(&text) {
            return;
        }
        let Some(parent) = get_parent_node(node) else {
            return;
        };

        // 页面自带的 ruby 或已注音区域内部不再处理
        if closest(&parent, |n| {
            get_node_name(n) == Some("ruby") || has_node_attr(n, ANNOTATION_ATTR)
        })
        .is_some()
        {
            return;
        }

        let mut fragment: Vec<Handle> = Vec::new();
        let mut regions = 0;

        for run in split_runs(&text) {
            if !run.is_target_script {
                push_text(&mut fragment, &run.text);
                continue;
            }

            match phoneticize(&self.phoneticizer, &run.text) {
                Some(units) => {
                    for unit in units {
                        if unit.reading.is_empty() {
                            push_text(&mut fragment, &unit.glyph);
                        } else {
                            fragment.push(create_ruby(&unit));
                            regions += 1;
                        }
                    }
                }
                None => {
                    report.runs_skipped += 1;
                    push_text(&mut fragment, &run.text);
                }
            }
        }

        if regions > 0 && replace_node(node, fragment) {
            report.nodes_annotated += 1;
            report.regions_created += regions;
        }
    }
}

/// 构造单个注音区域
pub fn create_ruby(unit: &PhoneticUnit) -> Handle {
    let ruby = create_element("ruby", &[(ANNOTATION_ATTR, "1")]);
    append_child(&ruby, create_text(&unit.glyph));

    let rt = create_element("rt", &[]);
    append_child(&rt, create_text(&unit.reading));
    append_child(&ruby, rt);

    ruby
}

/// 追加文本，和前一个文本节点相邻时直接合并
fn push_text(fragment: &mut Vec<Handle>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = fragment.last() {
        if let Some(previous) = get_text(last) {
            set_text(last, &format!("{}{}", previous, text));
            return;
        }
    }
    fragment.push(create_text(text));
}
