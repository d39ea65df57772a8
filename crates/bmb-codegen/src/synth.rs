//! Files written from constant templates rather than copied.

use std::fs;
use std::path::PathBuf;

use bmb_core::{BmbError, Result};

use crate::project::ProjectSpec;
use crate::template::render;
use crate::template_vars;

/// A synthesized project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    EnvExample,
    GitIgnore,
    Requirements,
    RunScript,
    Readme,
}

impl FileRole {
    /// Every role, in write order.
    pub const ALL: [FileRole; 5] = [
        FileRole::EnvExample,
        FileRole::GitIgnore,
        FileRole::Requirements,
        FileRole::RunScript,
        FileRole::Readme,
    ];

    /// Path of the file relative to the project root.
    pub fn relative_path(&self) -> &'static str {
        match self {
            FileRole::EnvExample => ".env.example",
            FileRole::GitIgnore => ".gitignore",
            FileRole::Requirements => "requirements.txt",
            FileRole::RunScript => "run.py",
            FileRole::Readme => "README.md",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileRole::EnvExample => "environment example",
            FileRole::GitIgnore => "ignore file",
            FileRole::Requirements => "dependency manifest",
            FileRole::RunScript => "run entry point",
            FileRole::Readme => "readme",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            FileRole::EnvExample => ENV_EXAMPLE,
            FileRole::GitIgnore => GITIGNORE,
            FileRole::Requirements => REQUIREMENTS,
            FileRole::RunScript => RUN_SCRIPT,
            FileRole::Readme => README,
        }
    }

    /// Final content of this file for a project.
    pub fn render(&self, spec: &ProjectSpec) -> String {
        let port = spec.port.to_string();
        let vars = template_vars!(
            "name" => spec.name.as_str(),
            "port" => port.as_str(),
            "host" => spec.host.as_str(),
        );
        render(self.template(), &vars)
    }
}

/// Write every synthesized file under the project root.
///
/// Stops at the first failed write; the error names the role and path.
pub fn synthesize(spec: &ProjectSpec) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(FileRole::ALL.len());

    for role in FileRole::ALL {
        let path = spec.root.join(role.relative_path());
        fs::write(&path, role.render(spec)).map_err(|e| {
            BmbError::Template(format!(
                "failed to write {} ({}): {}",
                role.label(),
                path.display(),
                e
            ))
        })?;
        tracing::info!(file = role.relative_path(), "Synthesized file");
        written.push(path);
    }

    Ok(written)
}

const ENV_EXAMPLE: &str = "\
# {{name}} configuration
# Copy to .env and adjust.
DB_CONNECTION=sqlite:///app.db
JWT_SECRET=change-me
JWT_EXPIRATION_HOURS=24
FLASK_ENV=development
DEBUG=True
HOST={{host}}
PORT={{port}}
CORS_ORIGINS=*
AUTO_LOAD_MODELS=True
CREATE_TABLES_ON_START=True
DEFAULT_PAGE_SIZE=20
MAX_PAGE_SIZE=100
";

const GITIGNORE: &str = "\
# Environment
.env
.venv
env/
venv/

# Python
__pycache__/
*.py[cod]
*$py.class
build/
dist/
*.egg-info/

# Database
*.db
*.sqlite
*.sqlite3

# Logs
*.log
logs/

# Uploads
uploads/*
!uploads/.gitkeep

# IDE
.vscode/
.idea/
*.swp

# OS
.DS_Store
Thumbs.db
";

const REQUIREMENTS: &str = "\
Flask>=2.0.0
Flask-CORS>=3.0.0
python-dotenv>=0.19.0
PyJWT>=2.0.0
bmdb>=1.0.0
";

const RUN_SCRIPT: &str = "\
\"\"\"
Entry point for {{name}}.
\"\"\"
import os

from app import create_app
from config import AppConfig

app = create_app()

if __name__ == '__main__':
    host = os.getenv('HOST', '{{host}}')
    port = int(os.getenv('PORT', {{port}}))
    print(f\"Starting {{name}} on http://{host}:{port}\")
    app.run(host=host, port=port, debug=AppConfig.DEBUG)
";

const README: &str = "\
# {{name}}

Generated with BMB.

## Setup

```bash
python -m venv venv
source venv/bin/activate
pip install -r requirements.txt
cp .env.example .env
```

## Models

Declare models in `models.bmdb`, then:

```bash
bmb create Product --fields name:string price:float
bmb generate-crud Product
```

## Run

```bash
python run.py
```

The API listens on port {{port}} by default.

| Endpoint | Description |
|---|---|
| `GET /api/health` | health check |
| `POST /api/auth/register` | create an account |
| `POST /api/auth/login` | get a token |
| `GET /api/auth/me` | current user |
| `GET /api/models` | loaded models |
";
