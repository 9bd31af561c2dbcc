use crate::error::SpecError;
use crate::models::page::Hierarchy;
use std::path::Path;
use tokio::fs;

/// 随程序发布的课程层级
const BUILTIN_COURSE: &str = include_str!("../../../hierarchy/course.toml");

/// 内置的课程层级（Content / Pre-filled Code / Instructions）
pub fn builtin_course() -> Result<Hierarchy, SpecError> {
    parse_hierarchy(BUILTIN_COURSE, "<builtin course.toml>")
}

/// 从 TOML 文件加载页面层级
pub async fn load_hierarchy(toml_file_path: &Path) -> Result<Hierarchy, SpecError> {
    let path = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| SpecError::ReadFailed {
            path: path.clone(),
            source,
        })?;

    let hierarchy = parse_hierarchy(&content, &path)?;
    tracing::info!(
        "成功加载层级描述: {} ({} 个页面)",
        path,
        hierarchy.page_count()
    );
    Ok(hierarchy)
}

/// 解析并校验 TOML 文本
pub fn parse_hierarchy(content: &str, path: &str) -> Result<Hierarchy, SpecError> {
    let hierarchy: Hierarchy =
        toml::from_str(content).map_err(|source| SpecError::TomlParseFailed {
            path: path.to_string(),
            source,
        })?;
    hierarchy.validate()?;
    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block_spec::SpecKind;

    #[test]
    fn test_builtin_course_shape() {
        let course = builtin_course().unwrap();
        let titles: Vec<_> = course.pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Content", "Pre-filled Code", "Instructions"]);

        let instructions = &course.pages[2];
        assert_eq!(instructions.pages.len(), 3);
        for (i, instruction) in instructions.pages.iter().enumerate() {
            let n = i + 1;
            assert_eq!(instruction.title, format!("Instruction {}", n));
            let sub: Vec<_> = instruction.pages.iter().map(|p| p.title.as_str()).collect();
            assert_eq!(sub, vec!["Content", "Error Messages", "Correct Answers"]);
            assert_eq!(
                instruction.pages[1].pages[0].title,
                format!("Error Message {}", n)
            );
            assert_eq!(
                instruction.pages[2].pages[0].blocks[0].kind,
                SpecKind::Code
            );
        }

        // 根下 3 页 + 每个 Instruction 6 页
        assert_eq!(course.page_count(), 3 + 3 * 6);
    }

    #[test]
    fn test_content_page_keeps_nested_hints() {
        let course = builtin_course().unwrap();
        let content = &course.pages[0];
        let steps: Vec<_> = content
            .blocks
            .iter()
            .filter(|b| b.kind == SpecKind::NumberedListItem)
            .collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].children[0].kind, SpecKind::Toggle);
        assert_eq!(steps[0].children[0].children[0].kind, SpecKind::Paragraph);
    }

    #[test]
    fn test_parse_errors_carry_path() {
        let err = parse_hierarchy("pages = 3", "bad.toml").unwrap_err();
        assert!(matches!(err, SpecError::TomlParseFailed { ref path, .. } if path == "bad.toml"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_hierarchy(Path::new("does/not/exist.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, SpecError::ReadFailed { .. }));
    }
}
