use crate::entity::EntityKind;

const MISSIONS_QUERY: &str = "query Query {
  missions {
    id
    description
    manufacturers
    name
    twitter
    website
  }
}
";

const ROCKETS_QUERY: &str = "query Query {
  rockets {
    id
    name
    active
    boosters
    company
    cost_per_launch
    country
    diameter {
      meters
    }
    height {
      meters
    }
    mass {
      kg
    }
    stages
    success_rate_pct
    type
  }
}
";

const LAUNCHES_QUERY: &str = "query Query {
  launches {
    id
    details
    mission_id
    mission_name
    rocket {
      rocket_name
      rocket_type
      rocket {
        id
      }
    }
    upcoming
    launch_success
  }
}
";

/// GraphQL query selecting the fixed field set of an entity kind
pub fn build_query(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Missions => MISSIONS_QUERY,
        EntityKind::Rockets => ROCKETS_QUERY,
        EntityKind::Launches => LAUNCHES_QUERY,
    }
}

/// Dotted leaf field paths selected by a query, in selection order
pub fn selected_fields(query: &str) -> Vec<String> {
    let mut path: Vec<&str> = Vec::new();
    let mut fields = Vec::new();
    let mut pending: Option<&str> = None;

    for token in query
        .split_whitespace()
        .flat_map(split_braces)
        .filter(|t| !t.is_empty())
    {
        match token {
            "{" => {
                if let Some(name) = pending.take() {
                    path.push(name);
                }
            }
            "}" => {
                if let Some(name) = pending.take() {
                    fields.push(leaf_path(&path, name));
                }
                path.pop();
            }
            name => {
                if let Some(prev) = pending.replace(name) {
                    fields.push(leaf_path(&path, prev));
                }
            }
        }
    }

    // Skip the operation header and the root field
    let depth = 2;
    fields
        .into_iter()
        .filter_map(|f| {
            let parts: Vec<&str> = f.split('.').collect();
            (parts.len() > depth).then(|| parts[depth..].join("."))
        })
        .collect()
}

fn leaf_path(path: &[&str], name: &str) -> String {
    let mut parts = path.to_vec();
    parts.push(name);
    parts.join(".")
}

fn split_braces(token: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, c) in token.char_indices() {
        if c == '{' || c == '}' {
            out.push(&token[start..idx]);
            out.push(&token[idx..idx + 1]);
            start = idx + 1;
        }
    }
    out.push(&token[start..]);
    out
}
