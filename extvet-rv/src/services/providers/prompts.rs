//! Prompt templates for the three provider operations
//!
//! Each template pins the exact response field names the parser expects:
//! name, category, rating, description, functionality, useCase, users, and
//! for the recommendation call isApproved, reason, securityConcerns.

use extvet_common::models::{Category, Extension};

/// The category labels as presented to the model
pub fn category_list() -> String {
    Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt for the analyze operation
pub fn analysis_prompt(extension_id: &str, extension_name: &str) -> String {
    format!(
        r#"Analyze the Chrome extension "{name}" with ID "{id}".

Provide a detailed analysis in the following JSON format:
{{
  "name": "{name}",
  "category": "one of: {categories}",
  "rating": "estimated rating from 1.0 to 5.0 based on typical user feedback",
  "description": "concise description of what this extension does",
  "functionality": "detailed explanation of core features and capabilities",
  "useCase": "primary use cases and target audience",
  "users": "estimated number of users (as integer)"
}}

Base your analysis on:
1. Extension name patterns and keywords
2. Common functionality associated with similar extensions
3. Typical security considerations for this type of extension
4. Market data for similar extensions

Respond with ONLY the JSON object, no additional text."#,
        name = extension_name,
        id = extension_id,
        categories = category_list(),
    )
}

/// Prompt for the find-comparable operation
pub fn similar_prompt(extension: &Extension) -> String {
    format!(
        r#"Find 3-5 similar Chrome extensions to "{name}" in the "{category}" category.

The original extension functionality: {functionality}
Use case: {use_case}

Provide alternatives in the following JSON format:
{{
  "alternatives": [
    {{
      "name": "extension name",
      "category": "{category}",
      "rating": "rating from 1.0 to 5.0",
      "description": "brief description",
      "functionality": "what it does",
      "useCase": "primary use case",
      "users": "estimated user count as integer"
    }}
  ]
}}

Focus on:
1. Popular, well-known alternatives
2. Extensions with similar functionality
3. Reputable extensions with good security track records
4. Extensions that serve the same use case

Respond with ONLY the JSON object, no additional text."#,
        name = extension.name,
        category = extension.category,
        functionality = extension.functionality,
        use_case = extension.use_case,
    )
}

/// Prompt for the recommendation operation. `overlapping` is the locally
/// computed set of approved items sharing category or functionality.
pub fn recommendation_prompt(extension: &Extension, overlapping: &[Extension]) -> String {
    let alternatives = overlapping
        .iter()
        .map(|ext| format!("- {}: {}", ext.name, ext.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze whether to approve the Chrome extension "{name}" based on the following criteria:

Extension Details:
- Name: {name}
- Category: {category}
- Rating: {rating}
- Users: {users}
- Functionality: {functionality}
- Use Case: {use_case}

Approved Alternatives Available:
{alternatives}

Security Evaluation Criteria:
1. Rating should be 4.0+ for approval
2. User base should be 500,000+ for trust
3. Extension should not duplicate existing approved functionality
4. No security red flags in name or functionality

Provide recommendation in JSON format:
{{
  "isApproved": true/false,
  "reason": "detailed explanation of decision",
  "securityConcerns": ["list of any security concerns"]
}}

Respond with ONLY the JSON object, no additional text."#,
        name = extension.name,
        category = extension.category,
        rating = extension.rating,
        users = extension.users,
        functionality = extension.functionality,
        use_case = extension.use_case,
        alternatives = alternatives,
    )
}
