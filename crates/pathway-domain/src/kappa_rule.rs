//! Lectura y análisis de reglas Kappa.
//!
//! Sólo se interpreta lo necesario para la conversión a especies: agentes,
//! sitios con enlace (`[...]`) y estado (`{...}`), y la marca de modificación
//! `antes/después` dentro de un estado.

use std::collections::BTreeMap;

use crate::DomainError;

/// Sitio de un agente Kappa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KappaSite {
    pub name: String,
    pub binding: Option<String>,
    pub state: Option<String>,
}

/// Agente Kappa con sus sitios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KappaAgent {
    pub name: String,
    pub sites: Vec<KappaSite>,
}

/// Extrae las reglas nombradas de un modelo Kappa: líneas que comienzan con
/// el nombre entre comillas simples, seguido del texto de la regla.
pub fn read_rules(model_text: &str) -> BTreeMap<String, String> {
    let mut rules = BTreeMap::new();
    for line in model_text.lines() {
        if !line.starts_with('\'') {
            continue;
        }
        let rest = &line[1..];
        let close = match rest.find('\'') {
            Some(pos) => pos,
            None => continue,
        };
        let name = rest[..close].to_string();
        let rule = rest[close + 1..].trim().to_string();
        if !rule.is_empty() {
            rules.insert(name, rule);
        }
    }
    rules
}

/// Parsea el lado de agentes de una regla. La tasa tras `@` se descarta; la
/// forma de observable `|...|` se acepta tal cual.
pub fn parse_rule(rule: &str) -> Result<Vec<KappaAgent>, DomainError> {
    let agents_text = if let Some(at) = rule.find('@') {
        rule[..at].trim_end()
    } else if rule.starts_with('|') && rule.ends_with('|') {
        &rule[1..rule.len() - 1]
    } else {
        rule
    };

    let mut agents = Vec::new();
    for chunk in split_agents(agents_text) {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let open = chunk.find('(')
                        .ok_or_else(|| DomainError::RuleError(format!("agente sin sitios: {}", chunk)))?;
        if !chunk.ends_with(')') {
            return Err(DomainError::RuleError(format!("agente mal formado: {}", chunk)));
        }
        let name = chunk[..open].trim().to_string();
        let mut sites = Vec::new();
        for token in chunk[open + 1..chunk.len() - 1].split_whitespace() {
            sites.push(parse_site(token)?);
        }
        agents.push(KappaAgent { name, sites });
    }
    Ok(agents)
}

/// Separa agentes por `, ` al nivel superior, fuera de paréntesis.
fn split_agents(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.clone());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn parse_site(token: &str) -> Result<KappaSite, DomainError> {
    let mut name_end = token.len();
    let mut binding = None;
    let mut state = None;
    if let Some(open) = token.find('[') {
        let close = token.find(']')
                         .ok_or_else(|| DomainError::RuleError(format!("enlace sin cerrar: {}", token)))?;
        binding = Some(token[open + 1..close].to_string());
        name_end = name_end.min(open);
    }
    if let Some(open) = token.find('{') {
        let close = token.find('}')
                         .ok_or_else(|| DomainError::RuleError(format!("estado sin cerrar: {}", token)))?;
        state = Some(token[open + 1..close].to_string());
        name_end = name_end.min(open);
    }
    Ok(KappaSite { name: token[..name_end].to_string(),
                   binding,
                   state })
}

/// Agentes con al menos un sitio modificado (`antes/después`), reducidos a
/// esos sitios con el estado final.
pub fn modified_agents(agents: &[KappaAgent]) -> Vec<KappaAgent> {
    let mut modified = Vec::new();
    for agent in agents {
        let sites: Vec<KappaSite> = agent.sites
                                         .iter()
                                         .filter_map(|site| {
                                             let state = site.state.as_deref()?;
                                             let slash = state.find('/')?;
                                             Some(KappaSite { name: site.name.clone(),
                                                              binding: None,
                                                              state: Some(state[slash + 1..].to_string()) })
                                         })
                                         .collect();
        if !sites.is_empty() {
            modified.push(KappaAgent { name: agent.name.clone(),
                                       sites });
        }
    }
    modified
}

/// Etiquetas de la especie producida por los agentes modificados.
///
/// Devuelve la forma corta (`Tipo-sitio`, omitiendo sitios `act`) usada como
/// etiqueta de nodo y la forma Kappa (`Tipo(sitio{estado})`) usada para
/// reconocer el evento de interés.
pub fn species_label(modified: &[KappaAgent]) -> (String, String) {
    let mut species = String::new();
    for (index, agent) in modified.iter().enumerate() {
        if index > 0 {
            species.push_str(", ");
        }
        species.push_str(&agent.name);
        for site in &agent.sites {
            if !site.name.contains("act") {
                species.push('-');
                species.push_str(&site.name);
            }
        }
    }

    let mut kappa_species = String::new();
    for (index, agent) in modified.iter().enumerate() {
        if index > 0 {
            kappa_species.push_str(", ");
        }
        kappa_species.push_str(&agent.name);
        kappa_species.push('(');
        for (site_index, site) in agent.sites.iter().enumerate() {
            if site_index > 0 {
                kappa_species.push(' ');
            }
            kappa_species.push_str(&site.name);
            kappa_species.push('{');
            kappa_species.push_str(site.state.as_deref().unwrap_or(""));
            kappa_species.push('}');
        }
        kappa_species.push(')');
    }
    (species, kappa_species)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_rules_collects_quoted_names() {
        let model = "%agent: EGFR(Y1092{u p})\n\
                     'EGFR phos' EGFR(Y1092{u/p}) @ 1.0\n\
                     'EGFR binds GRB2' EGFR(Y1092{p}), GRB2(sh2[./1]) @ 0.1\n\
                     %obs: 'foo' |EGFR(Y1092{p})|\n";
        let rules = read_rules(model);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules["EGFR phos"], "EGFR(Y1092{u/p}) @ 1.0");
        assert!(rules.contains_key("EGFR binds GRB2"));
    }

    #[test]
    fn parse_rule_reads_sites_binding_and_state() {
        let agents = parse_rule("EGFR(Y1092{p}), GRB2(sh2[./1]) @ 0.1").expect("parse");
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "EGFR");
        assert_eq!(agents[0].sites[0].name, "Y1092");
        assert_eq!(agents[0].sites[0].state.as_deref(), Some("p"));
        assert_eq!(agents[1].sites[0].binding.as_deref(), Some("./1"));
    }

    #[test]
    fn parse_rule_accepts_observable_form() {
        let agents = parse_rule("|EGFR(Y1092{p})|").expect("parse");
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "EGFR");
    }

    #[test]
    fn modified_agents_keep_final_state() {
        let agents = parse_rule("EGFR(Y1092{u/p} act{on}), GRB2(sh2[1])").expect("parse");
        let modified = modified_agents(&agents);
        assert_eq!(modified.len(), 1);
        assert_eq!(modified[0].name, "EGFR");
        assert_eq!(modified[0].sites.len(), 1);
        assert_eq!(modified[0].sites[0].state.as_deref(), Some("p"));
    }

    #[test]
    fn species_label_skips_act_sites() {
        let agents = parse_rule("EGFR(Y1092{u/p} act{off/on})").expect("parse");
        let modified = modified_agents(&agents);
        let (species, kappa) = species_label(&modified);
        assert_eq!(species, "EGFR-Y1092");
        assert_eq!(kappa, "EGFR(Y1092{p} act{on})");
    }
}
