use crate::entities::{Project, ProjectGroup};
use std::collections::HashMap;

/// Group sibling projects by title prefix, keeping first-seen order
///
/// Grouping is presentational only; it does not imply a stored parent.
pub fn group_by_title_prefix(projects: Vec<Project>) -> Vec<ProjectGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ProjectGroup> = Vec::new();

    for project in projects {
        let prefix = project.title_prefix().to_string();
        match index.get(&prefix) {
            Some(&i) => groups[i].projects.push(project),
            None => {
                index.insert(prefix.clone(), groups.len());
                groups.push(ProjectGroup {
                    title: prefix,
                    description: project.description.clone(),
                    projects: vec![project],
                });
            }
        }
    }

    groups
}
